//! 传输层 - HTTP 客户端、重试、速率限制、中间件

pub mod http_client;
pub mod middleware;
pub mod rate_limit;
pub mod retry;

pub use http_client::HttpClient;
pub use middleware::{Middleware, MiddlewareChain};
pub use rate_limit::RateLimiter;
pub use retry::{RetryPolicy, RetryStrategy};
