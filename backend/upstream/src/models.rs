use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Number, Value};

pub const DEFAULT_BASE_URL: &str = "http://20.244.56.144/evaluation-service";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Users,
    UserPosts(String),
    PostComments(String),
    Numbers(NumberKind),
}

impl Resource {
    pub fn path(&self) -> String {
        match self {
            Resource::Users => "users".to_string(),
            Resource::UserPosts(user_id) => format!("users/{user_id}/posts"),
            Resource::PostComments(post_id) => format!("posts/{post_id}/comments"),
            Resource::Numbers(kind) => kind.path().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Primes,
    Even,
    Fibo,
    Rand,
}

impl NumberKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "p" => Some(NumberKind::Primes),
            "e" => Some(NumberKind::Even),
            "f" => Some(NumberKind::Fibo),
            "r" => Some(NumberKind::Rand),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            NumberKind::Primes => "primes",
            NumberKind::Even => "even",
            NumberKind::Fibo => "fibo",
            NumberKind::Rand => "rand",
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// `users` keeps the upstream key order, see [`UsersPayload::into_users`].
#[derive(Debug, Default, Deserialize)]
pub struct UsersPayload {
    #[serde(default)]
    pub users: Map<String, Value>,
}

impl UsersPayload {
    /// Users in enumeration order: array-index ids ascending, then every
    /// other id in the order upstream sent it.
    pub fn into_users(self) -> Vec<User> {
        let mut users: Vec<(Option<u32>, User)> = self
            .users
            .into_iter()
            .map(|(id, name)| {
                let name = match name {
                    Value::String(name) => name,
                    other => other.to_string(),
                };
                (array_index(&id), User { id, name })
            })
            .collect();

        // stable, so non-index ids keep arrival order
        users.sort_by_key(|(index, _)| (index.is_none(), *index));
        users.into_iter().map(|(_, user)| user).collect()
    }
}

/// Canonical decimal below 2^32 - 1: no sign, no leading zero.
fn array_index(key: &str) -> Option<u32> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if !canonical {
        return None;
    }

    key.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

/// Post id as upstream sent it, number or numeric string.
#[derive(Debug, Clone, PartialEq)]
pub struct PostId {
    raw: Value,
    value: u64,
}

impl PostId {
    pub fn value(&self) -> u64 {
        self.value
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self {
            raw: Value::from(value),
            value,
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Value::String(raw) => f.write_str(raw),
            _ => write!(f, "{}", self.value),
        }
    }
}

impl Serialize for PostId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;

        let value = match &raw {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            de::Error::custom(format!("post id {raw} is not a non-negative integer"))
        })?;

        Ok(Self { raw, value })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostsPayload {
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Comments body exactly as upstream sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentsPayload(pub Value);

impl CommentsPayload {
    pub fn comment_count(&self) -> usize {
        self.0
            .get("comments")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NumbersPayload {
    #[serde(default)]
    pub numbers: Vec<Number>,
}

/// A number from one of the upstream sequences. Serializes as the bare number.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    kind: NumberKind,
    raw: Number,
    value: f64,
}

impl Observation {
    pub fn new(kind: NumberKind, raw: Number) -> Option<Self> {
        let value = raw.as_f64().filter(|v| v.is_finite())?;

        Some(Self { kind, raw, value })
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_resource_paths() {
        assert_eq!(Resource::Users.path(), "users");
        assert_eq!(Resource::UserPosts("7".into()).path(), "users/7/posts");
        assert_eq!(
            Resource::PostComments("150".into()).path(),
            "posts/150/comments"
        );
        assert_eq!(Resource::Numbers(NumberKind::Fibo).path(), "fibo");
    }

    #[test]
    fn test_number_codes() {
        assert_eq!(NumberKind::from_code("p"), Some(NumberKind::Primes));
        assert_eq!(NumberKind::from_code("e"), Some(NumberKind::Even));
        assert_eq!(NumberKind::from_code("f"), Some(NumberKind::Fibo));
        assert_eq!(NumberKind::from_code("r"), Some(NumberKind::Rand));
        assert_eq!(NumberKind::from_code("x"), None);
        assert_eq!(NumberKind::from_code("primes"), None);
        assert_eq!(NumberKind::from_code(""), None);
    }

    fn user_ids(body: &str) -> Vec<String> {
        let payload: UsersPayload = serde_json::from_str(body).unwrap();

        payload.into_users().into_iter().map(|u| u.id).collect()
    }

    #[test]
    fn test_users_enumeration_order() {
        let ids = user_ids(
            r#"{"users": {"zed": "Z", "amy": "A", "01": "O", "+2": "P", "1": "One"}}"#,
        );
        assert_eq!(ids, ["1", "zed", "amy", "01", "+2"]);

        let ids = user_ids(
            r#"{"users": {"10": "Ten", "b": "Bee", "2": "Two", "0": "Zero", "a": "Ay"}}"#,
        );
        assert_eq!(ids, ["0", "2", "10", "b", "a"]);
    }

    #[test]
    fn test_users_index_upper_bound() {
        let ids = user_ids(
            r#"{"users": {"4294967295": "Max", "x": "X", "4294967294": "Last"}}"#,
        );
        assert_eq!(ids, ["4294967294", "4294967295", "x"]);
    }

    #[test]
    fn test_user_name_kept() {
        let payload: UsersPayload =
            serde_json::from_str(r#"{"users": {"7": "Grace", "8": 42}}"#).unwrap();

        assert_eq!(
            payload.into_users(),
            [
                User {
                    id: "7".to_string(),
                    name: "Grace".to_string(),
                },
                User {
                    id: "8".to_string(),
                    name: "42".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_collections_default_empty() {
        let users: UsersPayload = serde_json::from_value(json!({})).unwrap();
        let posts: PostsPayload = serde_json::from_value(json!({})).unwrap();
        let numbers: NumbersPayload = serde_json::from_value(json!({})).unwrap();

        assert!(users.users.is_empty());
        assert!(posts.posts.is_empty());
        assert!(numbers.numbers.is_empty());
    }

    #[test]
    fn test_post_keeps_upstream_fields() {
        let post: Post = serde_json::from_value(json!({
            "id": 246, "userid": 1, "content": "Post about ant"
        }))
        .unwrap();

        assert_eq!(post.id.value(), 246);
        assert_eq!(post.id.to_string(), "246");
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({ "id": 246, "userid": 1, "content": "Post about ant" })
        );
    }

    #[test]
    fn test_post_string_id() {
        let post: Post = serde_json::from_value(json!({ "id": "0150", "userid": 1 })).unwrap();

        assert_eq!(post.id.value(), 150);
        assert_eq!(post.id.to_string(), "0150");
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({ "id": "0150", "userid": 1 })
        );
    }

    #[test]
    fn test_post_bad_id_rejected() {
        for id in [json!("abc"), json!(-3), json!(1.5), json!(null)] {
            let result: Result<Post, _> = serde_json::from_value(json!({ "id": id }));
            assert!(result.is_err(), "{id} should be rejected");
        }
    }

    #[test]
    fn test_comments_payload_verbatim() {
        let missing: CommentsPayload = serde_json::from_value(json!({ "page": 2 })).unwrap();
        assert_eq!(missing.comment_count(), 0);
        assert_eq!(serde_json::to_value(&missing).unwrap(), json!({ "page": 2 }));

        let listed: CommentsPayload =
            serde_json::from_value(json!({ "comments": [{ "id": 1 }, { "id": 2 }] })).unwrap();
        assert_eq!(listed.comment_count(), 2);

        let odd: CommentsPayload = serde_json::from_value(json!(["not", "an", "object"])).unwrap();
        assert_eq!(odd.comment_count(), 0);
        assert_eq!(serde_json::to_value(&odd).unwrap(), json!(["not", "an", "object"]));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let result: Result<NumbersPayload, _> =
            serde_json::from_value(json!({ "numbers": [1, "two", 3] }));

        assert!(result.is_err());
    }

    #[test]
    fn test_observation_serializes_raw() {
        let int = Observation::new(NumberKind::Even, Number::from(4)).unwrap();
        let float = Observation::new(NumberKind::Rand, Number::from_f64(2.5).unwrap()).unwrap();

        assert_eq!(serde_json::to_string(&int).unwrap(), "4");
        assert_eq!(serde_json::to_string(&float).unwrap(), "2.5");
        assert_eq!(int.value(), 4.0);
        assert_eq!(int.kind(), NumberKind::Even);
    }
}
