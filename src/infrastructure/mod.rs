pub mod chat_page;
pub mod js_executor;
pub mod surface;

pub use chat_page::{ChatLine, ChromiumChatPage, PageSelectors, SurfaceHandle};
pub use js_executor::JsExecutor;
pub use surface::ChatSurface;
