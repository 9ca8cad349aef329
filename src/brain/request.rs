//! Requests accepted by the brain and the responses it produces

use serde::Serialize;
use std::collections::BTreeMap;

use super::types::{OneOrMany, Stats};

/// Target of a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListTarget {
    All,
    Trigger(String),
}

impl From<&str> for ListTarget {
    fn from(value: &str) -> Self {
        if value == "all" {
            ListTarget::All
        } else {
            ListTarget::Trigger(value.to_string())
        }
    }
}

/// A single request intent.
///
/// Variants are listed in dispatch priority order; [`RawRequest::into_request`]
/// picks the first one whose required fields are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Remove {
        trigger: String,
        index: Option<String>,
    },
    List(ListTarget),
    Edit {
        trigger: String,
        replacement: String,
    },
    Teach {
        trigger: String,
        replies: OneOrMany,
        teacher: Option<String>,
    },
    Lookup {
        text: String,
        sender: Option<String>,
    },
    Welcome,
}

/// Loosely-typed request fields as a transport receives them.
///
/// Empty strings are treated the same as missing values.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub text: Option<String>,
    pub sender_id: Option<String>,
    pub remove: Option<String>,
    pub index: Option<String>,
    pub list: Option<String>,
    pub edit: Option<String>,
    pub replace: Option<String>,
    pub teach: Option<String>,
    pub reply: Vec<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl RawRequest {
    /// Resolve the request intent: remove > list > edit > teach > text > welcome
    pub fn into_request(self) -> Request {
        let sender = present(self.sender_id);

        if let Some(trigger) = present(self.remove) {
            return Request::Remove {
                trigger,
                index: present(self.index),
            };
        }

        if let Some(list) = present(self.list) {
            return Request::List(ListTarget::from(list.as_str()));
        }

        if let (Some(trigger), Some(replacement)) = (present(self.edit), present(self.replace)) {
            return Request::Edit { trigger, replacement };
        }

        let replies = OneOrMany::many(self.reply.into_iter().filter(|r| !r.is_empty()).collect());
        if let (Some(trigger), Some(replies)) = (present(self.teach), replies) {
            return Request::Teach {
                trigger,
                replies,
                teacher: sender,
            };
        }

        if let Some(text) = present(self.text) {
            return Request::Lookup { text, sender };
        }

        Request::Welcome
    }
}

/// `{ "teacherList": [{ id: count }, ...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherList {
    #[serde(rename = "teacherList")]
    pub teacher_list: Vec<BTreeMap<String, u64>>,
}

/// Response payloads, serialized in the service's JSON wire shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Reply {
        reply: String,
    },
    Taught {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        teacher: Option<String>,
        teachs: u64,
        #[serde(rename = "replyCount")]
        reply_count: usize,
    },
    ListAll {
        length: usize,
        teacher: TeacherList,
    },
    ListCount {
        data: usize,
    },
    Welcome {
        message: String,
        stats: Stats,
    },
    Message {
        message: String,
    },
}

impl Response {
    pub fn message(message: impl Into<String>) -> Self {
        Response::Message {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawRequest {
        RawRequest::default()
    }

    #[test]
    fn test_remove_has_top_priority() {
        let req = RawRequest {
            remove: Some("x".into()),
            list: Some("all".into()),
            teach: Some("t".into()),
            reply: vec!["r".into()],
            text: Some("hello".into()),
            ..raw()
        }
        .into_request();
        assert_eq!(req, Request::Remove { trigger: "x".into(), index: None });
    }

    #[test]
    fn test_list_modes() {
        let all = RawRequest { list: Some("all".into()), ..raw() }.into_request();
        assert_eq!(all, Request::List(ListTarget::All));
        let one = RawRequest { list: Some("hello".into()), ..raw() }.into_request();
        assert_eq!(one, Request::List(ListTarget::Trigger("hello".into())));
    }

    #[test]
    fn test_edit_needs_both_fields() {
        let req = RawRequest {
            edit: Some("x".into()),
            text: Some("hi".into()),
            ..raw()
        }
        .into_request();
        assert_eq!(req, Request::Lookup { text: "hi".into(), sender: None });
    }

    #[test]
    fn test_teach_collects_replies() {
        let req = RawRequest {
            teach: Some("hi".into()),
            reply: vec!["a".into(), "".into(), "b".into()],
            sender_id: Some("u1".into()),
            ..raw()
        }
        .into_request();
        match req {
            Request::Teach { trigger, replies, teacher } => {
                assert_eq!(trigger, "hi");
                assert_eq!(replies.as_slice(), ["a".to_string(), "b".to_string()]);
                assert_eq!(teacher.as_deref(), Some("u1"));
            }
            other => panic!("expected teach, got {other:?}"),
        }
    }

    #[test]
    fn test_teach_without_reply_falls_through() {
        let req = RawRequest {
            teach: Some("hi".into()),
            reply: vec!["".into()],
            ..raw()
        }
        .into_request();
        assert_eq!(req, Request::Welcome);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let req = RawRequest {
            remove: Some("".into()),
            list: Some("".into()),
            text: Some("yo".into()),
            sender_id: Some("".into()),
            ..raw()
        }
        .into_request();
        assert_eq!(req, Request::Lookup { text: "yo".into(), sender: None });
    }

    #[test]
    fn test_response_wire_shapes() {
        let taught = Response::Taught {
            message: "Successfully taught \"hi\"".into(),
            teacher: None,
            teachs: 0,
            reply_count: 2,
        };
        let value = serde_json::to_value(&taught).unwrap();
        assert_eq!(value["replyCount"], 2);
        assert!(value.get("teacher").is_none());

        let list = Response::ListAll {
            length: 1,
            teacher: TeacherList {
                teacher_list: vec![BTreeMap::from([("u1".to_string(), 3)])],
            },
        };
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["teacher"]["teacherList"][0]["u1"], 3);
    }
}
