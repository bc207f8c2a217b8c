mod config;
mod error;
mod utils {
    pub mod dom;
    pub mod frame;
    pub mod idle;
    pub mod observer;
}
mod motion {
    pub mod policy;
}
mod effects {
    pub mod confetti;
    pub mod glow;
    pub mod particles;
    pub mod ripple;
}
mod scroll {
    pub mod counter;
    pub mod navbar;
    pub mod parallax;
    pub mod reveal;
}
mod forms {
    pub mod calendar;
    pub mod calendar_dom;
    pub mod upload;
    pub mod wizard;
    pub mod wizard_dom;
}
mod pages {
    pub mod faq;
    pub mod landing;
    pub mod nav;
}

use config::LandingConfig;

fn main() {
    console_error_panic_hook::set_once();

    let (config, config_error) = match config::load() {
        Ok(config) => (config, None),
        Err(e) => (LandingConfig::default(), Some(e)),
    };
    wasm_logger::init(wasm_logger::Config::new(config.log_level()));
    if let Some(e) = config_error {
        log::warn!("Ignoring #{}: {}", config::CONFIG_ELEMENT_ID, e);
    }

    pages::landing::boot(config);
}
