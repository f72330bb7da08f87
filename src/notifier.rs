//! HTTP 通知器 - 将触发器生命周期事件 POST 到用户配置的 URL
//!
//! URL、payload 和请求头都支持属性替换模板，可用属性：
//! - `config.*` - 监听器配置
//! - `event.*` - 事件属性
//! - `stage` - 当前处理阶段
//! - `actionName` - 可选的当前动作名
//! - `context.*` - 可选的动作上下文属性
//! - `error` - 可选的错误描述
//! - `message` - 可选的消息
//!
//! 支持的监听器配置：
//! - `url` - URL 模板（必填）
//! - `payload` - 可选 payload 模板，缺省时发送上面全部属性组成的 JSON 对象
//! - `contentType` - 可选内容类型，缺省为 `application/json`
//! - `header.<name>` - 可选请求头模板，去掉前缀即为字面头名称
//!
//! 投递是尽力而为：传输失败和非 200 响应只记录 warning，
//! 绝不打断调用方的事件处理流程。

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{
    ListenerConfig, CONFIG_CONTENT_TYPE, CONFIG_PAYLOAD, CONFIG_URL, DEFAULT_CONTENT_TYPE,
    HEADER_PREFIX,
};
use crate::event::{ActionContext, ProcessingStage, TriggerEvent};
use crate::properties::{stringify, FlatProperties};
use crate::template::substitute;

/// 单次投递的结果，只用于内部日志
#[derive(Debug)]
enum Delivery {
    /// 端点返回 200
    Delivered(u16),
    /// 端点返回非 200 状态
    Rejected(u16),
    /// 请求未能完成（模板、请求头或传输失败）
    Failed(String),
}

/// HTTP 通知器
///
/// 初始化后模板和请求头全部只读，可在多线程间并发调用。
#[derive(Debug)]
pub struct HttpNotifier {
    /// 共享的 HTTP 客户端句柄（连接池归调用方所有）
    client: Client,
    config: ListenerConfig,
    url_template: String,
    payload_template: Option<String>,
    content_type: Option<String>,
    /// 头名称 -> 头值模板
    header_templates: BTreeMap<String, String>,
}

impl HttpNotifier {
    /// 从监听器配置创建通知器
    ///
    /// `url` 配置缺失或不是字符串时在这里直接失败，不推迟到首个事件。
    pub fn new(client: Client, config: ListenerConfig) -> Result<Self> {
        let url_template = match config.properties.get(CONFIG_URL) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(anyhow!(
                    "Listener '{}' requires a non-empty '{}' property",
                    config.name,
                    CONFIG_URL
                ))
            }
        };
        let payload_template = config
            .properties
            .get(CONFIG_PAYLOAD)
            .and_then(Value::as_str)
            .map(str::to_string);
        let content_type = config
            .properties
            .get(CONFIG_CONTENT_TYPE)
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut header_templates = BTreeMap::new();
        for (key, value) in &config.properties {
            if let Some(name) = key.strip_prefix(HEADER_PREFIX) {
                header_templates.insert(name.to_string(), stringify(value));
            }
        }

        Ok(Self {
            client,
            config,
            url_template,
            payload_template,
            content_type,
            header_templates,
        })
    }

    /// 处理一个生命周期事件，同步阻塞到 HTTP 往返结束
    ///
    /// 只有 URL 模板解析失败会返回错误；投递期的一切失败
    /// （传输错误、非 200 响应）都被记录并吞掉。
    pub fn on_event(
        &self,
        event: &TriggerEvent,
        stage: ProcessingStage,
        action_name: Option<&str>,
        context: Option<&ActionContext>,
        error: Option<&anyhow::Error>,
        message: Option<&str>,
    ) -> Result<()> {
        let props = FlatProperties::flatten(
            event,
            stage,
            action_name,
            context,
            error,
            message,
            &self.config,
        );

        // 没有 URL 就无从投递，这是唯一向调用方传播的投递期失败
        let url = substitute(&self.url_template, &props)
            .map_err(|e| anyhow!("Cannot resolve webhook URL for {}: {}", event, e))?;

        match self.dispatch(&url, &props) {
            Delivery::Delivered(status) => {
                debug!(event = %event, url = %url, status, "Webhook delivered");
            }
            Delivery::Rejected(status) => {
                warn!(
                    event = %event,
                    url = %url,
                    status,
                    "Webhook endpoint returned non-success status"
                );
            }
            Delivery::Failed(reason) => {
                warn!(event = %event, url = %url, reason = %reason, "Webhook delivery failed");
            }
        }

        Ok(())
    }

    /// 组装并发送一次 POST，把所有结果折叠成 `Delivery`
    fn dispatch(&self, url: &str, props: &FlatProperties) -> Delivery {
        let (payload, content_type) = match &self.payload_template {
            Some(template) => {
                let payload = match substitute(template, props) {
                    Ok(p) => p,
                    Err(e) => return Delivery::Failed(format!("payload template: {}", e)),
                };
                let content_type = self
                    .content_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                (payload, content_type)
            }
            // 无 payload 模板时发送全部扁平化属性，
            // 内容类型强制为 JSON，忽略 contentType 配置
            None => match props.to_json() {
                Ok(json) => (json, DEFAULT_CONTENT_TYPE.to_string()),
                Err(e) => return Delivery::Failed(e.to_string()),
            },
        };

        let mut headers = HeaderMap::new();
        for (name, template) in &self.header_templates {
            let value = match substitute(template, props) {
                Ok(v) => v,
                Err(e) => return Delivery::Failed(format!("header '{}': {}", name, e)),
            };
            // 解析为空的请求头整个省略，不发送空头
            if value.is_empty() {
                continue;
            }
            let header_name = match HeaderName::from_bytes(name.as_bytes()) {
                Ok(n) => n,
                Err(e) => return Delivery::Failed(format!("invalid header name '{}': {}", name, e)),
            };
            let header_value = match HeaderValue::from_str(&value) {
                Ok(v) => v,
                Err(e) => {
                    return Delivery::Failed(format!("invalid header value for '{}': {}", name, e))
                }
            };
            headers.insert(header_name, header_value);
        }
        // Content-Type 最后显式写入，覆盖同名的自定义头
        match HeaderValue::from_str(&content_type) {
            Ok(v) => {
                headers.insert(CONTENT_TYPE, v);
            }
            Err(e) => {
                return Delivery::Failed(format!("invalid content type '{}': {}", content_type, e))
            }
        }

        let response = match self.client.post(url).headers(headers).body(payload).send() {
            Ok(r) => r,
            Err(e) => return Delivery::Failed(e.to_string()),
        };

        let status = response.status().as_u16();
        // 无论状态如何都读完响应体，让连接可以复用
        let _ = response.bytes();

        if status == 200 {
            Delivery::Delivered(status)
        } else {
            Delivery::Rejected(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ListenerConfig {
        ListenerConfig::new("foo", "cpu_trigger", "http")
            .with_property("url", "http://example.com/${event.id}")
    }

    #[test]
    fn test_new_requires_url() {
        let config = ListenerConfig::new("foo", "cpu_trigger", "http");
        let result = HttpNotifier::new(Client::new(), config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("url"));
    }

    #[test]
    fn test_new_rejects_non_string_url() {
        let config = ListenerConfig::new("foo", "cpu_trigger", "http").with_property("url", 42);
        assert!(HttpNotifier::new(Client::new(), config).is_err());
    }

    #[test]
    fn test_new_rejects_empty_url() {
        let config = ListenerConfig::new("foo", "cpu_trigger", "http").with_property("url", "");
        assert!(HttpNotifier::new(Client::new(), config).is_err());
    }

    #[test]
    fn test_new_extracts_templates() {
        let config = base_config()
            .with_property("payload", "stage=${stage}")
            .with_property("contentType", "text/plain");
        let notifier = HttpNotifier::new(Client::new(), config).unwrap();

        assert_eq!(notifier.url_template, "http://example.com/${event.id}");
        assert_eq!(notifier.payload_template.as_deref(), Some("stage=${stage}"));
        assert_eq!(notifier.content_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_new_strips_header_prefix() {
        let config = base_config()
            .with_property("header.X-Token", "secret")
            .with_property("header.X-Trace", "${event.id}")
            .with_property("payload", "p");
        let notifier = HttpNotifier::new(Client::new(), config).unwrap();

        assert_eq!(notifier.header_templates.len(), 2);
        assert_eq!(
            notifier.header_templates.get("X-Token").map(String::as_str),
            Some("secret")
        );
        assert_eq!(
            notifier.header_templates.get("X-Trace").map(String::as_str),
            Some("${event.id}")
        );
    }

    #[test]
    fn test_new_ignores_unrelated_properties() {
        let config = base_config().with_property("note", "not a header");
        let notifier = HttpNotifier::new(Client::new(), config).unwrap();
        assert!(notifier.header_templates.is_empty());
        assert!(notifier.payload_template.is_none());
        assert!(notifier.content_type.is_none());
    }

    #[test]
    fn test_new_stringifies_header_values() {
        // 非字符串的头模板按通用字符串化处理
        let config = base_config().with_property("header.X-Limit", 10);
        let notifier = HttpNotifier::new(Client::new(), config).unwrap();
        assert_eq!(
            notifier.header_templates.get("X-Limit").map(String::as_str),
            Some("10")
        );
    }
}
