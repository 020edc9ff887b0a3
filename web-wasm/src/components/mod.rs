pub mod camera_view;
pub mod capture_area;
pub mod header;
pub mod result_card;
pub mod settings_panel;
pub mod status_panel;
