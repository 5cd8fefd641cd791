//! TUI widgets.

mod alert_list;
mod calendar;
mod common;
mod dashboard;
mod help;
mod news_feed;
mod notifications;
mod portfolio;
mod status_bar;
mod strategy;
mod swap_panel;
mod tab_bar;

pub use alert_list::AlertList;
pub use calendar::CalendarView;
pub use dashboard::Dashboard;
pub use help::HelpPanel;
pub use news_feed::NewsFeed;
pub use notifications::{InputLine, render_error, render_notification};
pub use portfolio::PortfolioView;
pub use status_bar::StatusBar;
pub use strategy::StrategyView;
pub use swap_panel::SwapPanel;
pub use tab_bar::TabBar;
