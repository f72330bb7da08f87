//! Trigger Webhook - 触发器生命周期事件的 HTTP 回调通知器
//!
//! 每次生命周期事件把事件、阶段、上下文和配置压平成字符串属性集，
//! 解析用户配置的 URL/payload/请求头模板，然后同步 POST 一次上报。
//! 投递是尽力而为：失败只通过日志观察，不影响调用方的事件处理。

pub mod config;
pub mod event;
pub mod notifier;
pub mod properties;
pub mod template;

pub use config::{
    ListenerConfig, CONFIG_CONTENT_TYPE, CONFIG_PAYLOAD, CONFIG_URL, DEFAULT_CONTENT_TYPE,
    HEADER_PREFIX,
};
pub use event::{ActionContext, EventType, ProcessingStage, TriggerEvent};
pub use notifier::HttpNotifier;
pub use properties::{stringify, FlatProperties};
pub use template::substitute;
