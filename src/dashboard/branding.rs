//! Sidebar footer: caption plus a linked logo inlined as a data URL.

use serde::Serialize;

use crate::data::floor_plan::file_data_url;
use crate::settings::DashboardSettings;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub caption: String,
    pub url: String,
    /// `None` when the logo file is missing; the footer is decorative only.
    pub image_data_url: Option<String>,
}

pub fn load_branding(settings: &DashboardSettings) -> Branding {
    let image_data_url = settings
        .resolve(&settings.branding_image)
        .and_then(|path| file_data_url(&path))
        .map_err(|err| log::warn!("branding image unavailable: {err:#}"))
        .ok();

    Branding {
        caption: settings.branding_caption.clone(),
        url: settings.branding_url.clone(),
        image_data_url,
    }
}
