// Application layer: the web surface that puts the dashboard in front of a browser.

pub mod server;
