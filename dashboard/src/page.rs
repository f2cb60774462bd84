use crate::view::DashboardView;
use common::{Error, Result};
use minijinja::{context, Environment};
use tracing::error;

const TEMPLATE_NAME: &str = "dashboard.html";

const FALLBACK_PAGE: &str = "<!DOCTYPE html><html><body><h1>Uniswap V2 Dashboard</h1>\
<p>The dashboard could not be rendered.</p>\
<form method=\"post\" action=\"/reload\"><button type=\"submit\">Reload</button></form>\
</body></html>";

/// HTML renderer for the dashboard page. Values are auto-escaped.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, include_str!("../templates/dashboard.html"))
            .map_err(|e| Error::InternalError(format!("Invalid dashboard template: {}", e)))?;
        Ok(Self { env })
    }

    /// Render the page. A rendering failure yields a minimal page with the
    /// reload control instead of an error.
    pub fn render(&self, view: &DashboardView) -> String {
        let rendered = self
            .env
            .get_template(TEMPLATE_NAME)
            .and_then(|template| template.render(context! { view => view }));

        match rendered {
            Ok(html) => html,
            Err(e) => {
                error!("Failed to render dashboard: {}", e);
                FALLBACK_PAGE.to_string()
            }
        }
    }
}
