//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod licenses;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
pub fn create_screens(currency: &str) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new(currency)),
        ),
        (
            ScreenId::Licenses,
            Box::new(licenses::LicensesScreen::new(currency)),
        ),
    ]
}
