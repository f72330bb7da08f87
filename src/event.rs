//! 事件数据模型 - 外部触发框架产生的只读事件结构
//!
//! 定义通知器消费的调用上下文：事件本体、处理阶段、动作上下文。
//! 这些结构由外部触发/自动化框架构造并传入，本 crate 只读取不修改。

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 事件类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// 定时触发
    Scheduled,
    /// 指标越过阈值
    Threshold,
    /// 被监控对象状态变化
    StateChange,
    /// 手动触发
    Manual,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Scheduled => "SCHEDULED",
            EventType::Threshold => "THRESHOLD",
            EventType::StateChange => "STATE_CHANGE",
            EventType::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 事件处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStage {
    Waiting,
    Started,
    BeforeAction,
    AfterAction,
    Succeeded,
    Failed,
    Aborted,
    Ignored,
}

impl ProcessingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStage::Waiting => "WAITING",
            ProcessingStage::Started => "STARTED",
            ProcessingStage::BeforeAction => "BEFORE_ACTION",
            ProcessingStage::AfterAction => "AFTER_ACTION",
            ProcessingStage::Succeeded => "SUCCEEDED",
            ProcessingStage::Failed => "FAILED",
            ProcessingStage::Aborted => "ABORTED",
            ProcessingStage::Ignored => "IGNORED",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 触发事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// 事件唯一标识
    pub id: String,
    /// 事件来源（触发器名称）
    pub source: String,
    /// 事件产生时间
    pub event_time: DateTime<Utc>,
    /// 事件类型
    pub event_type: EventType,
    /// 事件附带属性（任意键值）
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl TriggerEvent {
    /// 创建新事件，时间取当前时刻
    pub fn new(id: impl Into<String>, source: impl Into<String>, event_type: EventType) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            event_time: Utc::now(),
            event_type,
            properties: BTreeMap::new(),
        }
    }

    /// 设置事件时间
    pub fn with_event_time(mut self, event_time: DateTime<Utc>) -> Self {
        self.event_time = event_time;
        self
    }

    /// 添加事件属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} [{}]", self.source, self.id, self.event_type)
    }
}

/// 动作执行上下文（仅动作相关阶段存在）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionContext {
    /// 上下文属性
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl ActionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加上下文属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
