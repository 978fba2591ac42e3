//! Minimal W3C WebDriver client
//!
//! Only the commands the page objects need: sessions, navigation, element
//! lookup and interaction, screenshots.

mod client;
pub mod protocol;

pub use client::WebDriverClient;
pub use protocol::{xpath_literal, ElementRef, Locator};
