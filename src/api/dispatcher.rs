use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::api::error::ApiError;
use crate::core::{Query, Schema};
use crate::query::criteria::resolve;
use crate::query::params::{build_action_params, has_param};
use crate::query::scorer::RankMetric;
use crate::query::selector;
use crate::response::files::extract_version_files;
use crate::response::formatter::{Formatter, Selection};
use crate::storage::{Collection, EtagStore};

/// 公开动作集合
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Find,
    FindOne,
}

impl FromStr for Action {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "find" => Ok(Action::Find),
            "findOne" => Ok(Action::FindOne),
            other => Err(ApiError::InvalidAction(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    fn new(body: Value) -> Self {
        Self {
            body,
            headers: BTreeMap::new(),
        }
    }
}

/// 请求分派器：查询 → 候选 → 选择 → 整形
#[derive(Clone, Debug, Default)]
pub struct Api {
    schema: Schema,
    metric: RankMetric,
}

impl Api {
    pub fn new(schema: Schema, metric: RankMetric) -> Self {
        Self { schema, metric }
    }

    /// 公开入口。`exact_match` 只由需要缓存校验头的调用路径设置。
    pub fn process_request(
        &self,
        collection: &dyn Collection,
        etags: &dyn EtagStore,
        query: &Query,
        action: &str,
        exact_match: bool,
    ) -> Result<ApiResponse, ApiError> {
        match action.parse::<Action>()? {
            Action::Find => Ok(self.find(collection, query)),
            Action::FindOne => self.find_one(collection, etags, query, exact_match),
        }
    }

    fn find(&self, collection: &dyn Collection, query: &Query) -> ApiResponse {
        let criteria = resolve(query.name());
        let params = build_action_params(query, &self.schema);
        let libs = collection.find(&params);

        let selected = selector::find(&libs, criteria.as_ref(), &self.metric);
        tracing::debug!(
            "{}: find {} filters -> {} results",
            collection.name(),
            params.len(),
            selected.len()
        );
        ApiResponse::new(Formatter::new(&self.schema).format(query, &Selection::Many(selected)))
    }

    fn find_one(
        &self,
        collection: &dyn Collection,
        etags: &dyn EtagStore,
        query: &Query,
        exact_match: bool,
    ) -> Result<ApiResponse, ApiError> {
        if !has_param(query, &self.schema) {
            return Err(ApiError::MissingQuery);
        }

        let criteria = resolve(query.name());
        let params = build_action_params(query, &self.schema);
        let libs = collection.find(&params);

        let model = selector::find_one(&libs, criteria.as_ref(), exact_match, &self.metric)
            .ok_or(ApiError::RecordNotFound)?;
        tracing::debug!(
            "{}: findOne(exact={}) resolved {:?} -> {}",
            collection.name(),
            exact_match,
            query.name(),
            model.name
        );

        let mut headers = BTreeMap::new();
        if exact_match {
            if let Some(etag) = etags.lookup(collection.name(), &model.name) {
                headers.insert("ETag".to_string(), etag.to_string());
            }
        }

        let body = match query.version() {
            Some(version) => {
                let files = extract_version_files(model, version).ok_or(ApiError::VersionNotFound)?;
                Value::Array(files.iter().cloned().map(Value::String).collect())
            }
            None => Formatter::new(&self.schema).format(query, &Selection::One(model)),
        };

        Ok(ApiResponse { body, headers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Asset, Library};
    use crate::storage::{EtagEntry, MemoryCollection, MemoryEtagStore};
    use serde_json::json;

    fn fixture() -> (MemoryCollection, MemoryEtagStore) {
        let libs = vec![
            Library::new("jquery-ui")
                .with_attr("author", "jquery")
                .with_assets(vec![Asset::new("1.11.4", ["jquery-ui.js"])]),
            Library::new("jquery")
                .with_attr("author", "jquery")
                .with_attr("mainfile", "jquery.min.js")
                .with_assets(vec![
                    Asset::new("1.0.0", ["a.js"]),
                    Asset::new("2.1.4", ["jquery.js", "jquery.min.js"]),
                ]),
            Library::new("zepto").with_attr("author", "madrobby"),
        ];
        let etags = MemoryEtagStore::new(BTreeMap::from([(
            "jsdelivr".to_string(),
            vec![EtagEntry {
                path: "jquery".into(),
                etag: "\"e-jquery\"".into(),
            }],
        )]));
        (MemoryCollection::new("jsdelivr", libs), etags)
    }

    fn run(query: Query, action: &str, exact: bool) -> Result<ApiResponse, ApiError> {
        let (c, e) = fixture();
        Api::default().process_request(&c, &e, &query, action, exact)
    }

    #[test]
    fn invalid_action_is_501() {
        let err = run(Query::new(), "remove", false).unwrap_err();
        assert_eq!(err, ApiError::InvalidAction("remove".into()));
        assert_eq!(err.status_code(), 501);
    }

    #[test]
    fn find_ranks_by_name_closeness() {
        let r = run(Query::new().with("name", "jquery").with("fields", "name"), "find", false).unwrap();
        assert_eq!(r.body, json!([{"name": "jquery"}, {"name": "jquery-ui"}, {"name": "zepto"}]));
        assert!(r.headers.is_empty());
    }

    #[test]
    fn find_applies_filters_then_alternation() {
        let q = Query::new()
            .with("name", "jquery,zepto")
            .with("author", "jquery")
            .with("fields", "name");
        let r = run(q, "find", false).unwrap();
        assert_eq!(r.body, json!([{"name": "jquery"}]));
    }

    #[test]
    fn find_without_query_returns_everything_in_order() {
        let r = run(Query::new().with("fields", "name"), "find", false).unwrap();
        assert_eq!(r.body, json!([{"name": "jquery-ui"}, {"name": "jquery"}, {"name": "zepto"}]));
    }

    #[test]
    fn find_one_requires_a_usable_query() {
        let err = run(Query::new().with("fields", "name"), "findOne", false).unwrap_err();
        assert_eq!(err, ApiError::MissingQuery);
    }

    #[test]
    fn find_one_exact_attaches_etag() {
        let r = run(Query::new().with("name", "jquery"), "findOne", true).unwrap();
        assert_eq!(r.body["name"], json!("jquery"));
        assert!(r.body.get("assets").is_none());
        assert_eq!(r.headers.get("ETag").map(String::as_str), Some("\"e-jquery\""));
    }

    #[test]
    fn find_one_exact_without_etag_has_empty_headers() {
        let r = run(Query::new().with("name", "zepto"), "findOne", true).unwrap();
        assert!(r.headers.is_empty());
    }

    #[test]
    fn find_one_loose_never_sets_headers() {
        let r = run(Query::new().with("name", "jquery"), "findOne", false).unwrap();
        assert!(r.headers.is_empty());
    }

    #[test]
    fn find_one_exact_misses_near_name() {
        let err = run(Query::new().with("name", "jquer"), "findOne", true).unwrap_err();
        assert_eq!(err, ApiError::RecordNotFound);
    }

    #[test]
    fn find_one_loose_picks_nearest() {
        let r = run(Query::new().with("name", "jquer"), "findOne", false).unwrap();
        assert_eq!(r.body["name"], json!("jquery"));
    }

    #[test]
    fn find_one_without_name_exact_is_not_found() {
        let err = run(Query::new().with("author", "jquery"), "findOne", true).unwrap_err();
        assert_eq!(err, ApiError::RecordNotFound);
    }

    #[test]
    fn find_one_without_name_loose_takes_first_filtered() {
        let r = run(Query::new().with("author", "madrobby"), "findOne", false).unwrap();
        assert_eq!(r.body["name"], json!("zepto"));
    }

    #[test]
    fn find_one_empty_after_filters_is_not_found() {
        let err = run(Query::new().with("author", "nobody"), "findOne", false).unwrap_err();
        assert_eq!(err, ApiError::RecordNotFound);
    }

    #[test]
    fn version_files_and_missing_version() {
        let r = run(
            Query::new().with("name", "jquery").with("version", "2.1.4"),
            "findOne",
            true,
        )
        .unwrap();
        assert_eq!(r.body, json!(["jquery.js", "jquery.min.js"]));
        assert_eq!(r.headers.get("ETag").map(String::as_str), Some("\"e-jquery\""));

        let err = run(
            Query::new().with("name", "jquery").with("version", "9.9.9"),
            "findOne",
            true,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::VersionNotFound);
    }

    #[test]
    fn find_one_assets_requested_are_keyed_by_version() {
        let r = run(
            Query::new().with("name", "jquery").with("fields", "name,assets"),
            "findOne",
            true,
        )
        .unwrap();
        assert_eq!(
            r.body["assets"],
            json!({
                "1.0.0": {"files": ["a.js"]},
                "2.1.4": {"files": ["jquery.js", "jquery.min.js"]}
            })
        );
    }

    #[test]
    fn collection_is_not_mutated_by_requests() {
        let (c, e) = fixture();
        let before = c.data().to_vec();
        let api = Api::default();
        let q = Query::new().with("name", "jquery").with("fields", "name,assets");
        api.process_request(&c, &e, &q, "findOne", true).unwrap();
        api.process_request(&c, &e, &q, "find", false).unwrap();
        assert_eq!(c.data(), &before[..]);
    }
}
