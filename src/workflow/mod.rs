pub mod line_ctx;
pub mod line_flow;

pub use line_ctx::{LineCtx, ScanPass};
pub use line_flow::{extract_reference, LineFlow, VerificationOptions};
