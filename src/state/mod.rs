pub mod console;
pub mod document;
pub mod environment;
pub mod history;
pub mod request;
pub mod response;
pub mod tabs;
pub mod view;
