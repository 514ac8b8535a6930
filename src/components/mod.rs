pub mod sidebar;
pub mod theme_status;
pub mod theme_switcher;
