//! 监听器配置 - 通知器的只读配置结构
//!
//! `properties` 自由键值中约定了以下配置键：
//! - `url` - URL 模板（必填）
//! - `payload` - 可选的 payload 模板，缺省时发送全部扁平化属性组成的 JSON 对象
//! - `contentType` - 可选的 payload 内容类型
//! - `header.<name>` - 可选的请求头模板，去掉前缀后即为字面头名称

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::ProcessingStage;

/// 必填的 URL 模板配置键
pub const CONFIG_URL: &str = "url";
/// 可选的 payload 模板配置键
pub const CONFIG_PAYLOAD: &str = "payload";
/// 可选的内容类型配置键
pub const CONFIG_CONTENT_TYPE: &str = "contentType";
/// 请求头模板配置键前缀
pub const HEADER_PREFIX: &str = "header.";
/// 默认 payload 内容类型
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// 监听器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerConfig {
    /// 监听器名称
    pub name: String,
    /// 所属触发器名称
    pub trigger: String,
    /// 监听器类别标签
    pub listener_class: String,
    /// 在这些动作执行前通知
    #[serde(default)]
    pub before_actions: Vec<String>,
    /// 在这些动作执行后通知
    #[serde(default)]
    pub after_actions: Vec<String>,
    /// 关注的处理阶段（保持声明顺序）
    #[serde(default)]
    pub stages: Vec<ProcessingStage>,
    /// 自由配置属性（含 url/payload/contentType/header.*）
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl ListenerConfig {
    /// 创建新配置
    pub fn new(
        name: impl Into<String>,
        trigger: impl Into<String>,
        listener_class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: trigger.into(),
            listener_class: listener_class.into(),
            before_actions: Vec::new(),
            after_actions: Vec::new(),
            stages: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// 添加一个自由配置属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 设置关注的处理阶段
    pub fn with_stages(mut self, stages: Vec<ProcessingStage>) -> Self {
        self.stages = stages;
        self
    }

    /// 设置动作执行前通知的动作名
    pub fn with_before_actions(mut self, actions: Vec<String>) -> Self {
        self.before_actions = actions;
        self
    }

    /// 设置动作执行后通知的动作名
    pub fn with_after_actions(mut self, actions: Vec<String>) -> Self {
        self.after_actions = actions;
        self
    }
}
