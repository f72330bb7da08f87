//! 属性扁平化 - 将一次事件调用的全部上下文压平成字符串键值映射
//!
//! 模板解析要求被引用的键必须存在：缺失的数据一律以空字符串占位，
//! 避免替换阶段出现 missing key 失败。键按命名空间组织：
//! `event.*` / `config.*` / `context.*`，外加裸键
//! `stage` / `actionName` / `error` / `message`。
//!
//! 映射在单次 `on_event` 调用内构造、消费、丢弃，不跨事件共享。

use std::collections::BTreeMap;

use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;

use crate::config::ListenerConfig;
use crate::event::{ActionContext, ProcessingStage, TriggerEvent};

/// 通用字符串化
///
/// null 变为空字符串而不是字面 "null"；字符串原样返回；
/// 数字和布尔取稳定的十进制/字面形式；数组和对象取紧凑 JSON 文本。
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 单个事件的扁平化属性快照
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlatProperties(BTreeMap<String, String>);

impl FlatProperties {
    /// 创建空映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 按固定规则扁平化一次事件调用的上下文
    ///
    /// 各命名空间互不相交，后写入的键不会覆盖先写入的键。
    pub fn flatten(
        event: &TriggerEvent,
        stage: ProcessingStage,
        action_name: Option<&str>,
        context: Option<&ActionContext>,
        error: Option<&anyhow::Error>,
        message: Option<&str>,
        config: &ListenerConfig,
    ) -> Self {
        let mut props = Self::new();

        props.set("stage", stage.as_str());
        // 非动作阶段没有动作名，置空而不是缺键，否则模板替换会失败
        props.set("actionName", action_name.unwrap_or(""));
        if let Some(context) = context {
            for (key, value) in &context.properties {
                props.set(format!("context.{}", key), stringify(value));
            }
        }
        // 错误取描述性字符串，不带调用栈
        props.set(
            "error",
            error.map(|e| e.to_string()).unwrap_or_default(),
        );
        props.set("message", message.unwrap_or(""));

        props.set("event.id", event.id.as_str());
        props.set("event.source", event.source.as_str());
        props.set("event.eventTime", event.event_time.to_rfc3339());
        props.set("event.eventType", event.event_type.as_str());
        for (key, value) in &event.properties {
            props.set(format!("event.properties.{}", key), stringify(value));
        }

        props.set("config.name", config.name.as_str());
        props.set("config.trigger", config.trigger.as_str());
        props.set("config.listenerClass", config.listener_class.as_str());
        props.set("config.beforeActions", config.before_actions.join(","));
        props.set("config.afterActions", config.after_actions.join(","));
        let stages: Vec<&str> = config.stages.iter().map(|s| s.as_str()).collect();
        props.set("config.stages", stages.join(","));
        for (key, value) in &config.properties {
            props.set(format!("config.properties.{}", key), stringify(value));
        }

        props
    }

    /// 写入一个键值
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// 精确查找（大小写敏感）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// 按键序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 序列化为 JSON 对象（默认 payload 的形态）
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(&self.0)
            .map_err(|e| anyhow!("Cannot serialize flattened properties: {}", e))
    }
}
