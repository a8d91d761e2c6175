pub mod logging;
pub mod upstream; // Block.io HTTP 客户端
