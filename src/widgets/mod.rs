pub mod chart_view;
pub mod controls;
pub mod debug;
pub mod insights_view;
pub mod intro;
pub mod sidebar;
