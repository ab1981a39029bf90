use minijinja::Environment;

use crate::error::{AppError, AppResult};
use crate::workflow::dashboard::Dashboard;

const TEMPLATE_NAME: &str = "dashboard.html";

pub struct DashboardView {
    env: Environment<'static>,
}

impl DashboardView {
    pub fn new() -> AppResult<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, include_str!("../templates/dashboard.html"))
            .map_err(|err| AppError::Render(format!("invalid dashboard template: {err}")))?;
        Ok(Self { env })
    }

    pub fn render(&self, dashboard: &Dashboard) -> AppResult<String> {
        self.env
            .get_template(TEMPLATE_NAME)
            .and_then(|template| template.render(dashboard))
            .map_err(|err| AppError::Render(err.to_string()))
    }
}
