pub mod config;
pub mod events;
pub mod overlay;
pub mod schedule;
pub mod platform {
    pub mod finish_action;
}
pub mod processing {
    pub mod layout;
    pub mod placement;
}
pub mod tasks {
    pub mod countdown;
    pub mod files;
    pub mod loader;
    pub mod slideshow;
}
