// TUI widget modules for each dashboard panel.

pub mod attendance;
pub mod champion;
pub mod chart;
pub mod narrative;
pub mod season_select;
pub mod squad_value;
