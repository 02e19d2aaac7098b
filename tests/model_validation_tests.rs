use blog_api::models::{CreateCommentRequest, PostBody, PostPatch, SignupRequest};
use blog_api::pagination::PageParams;
use validator::Validate;

#[test]
fn signup_request_enforces_field_bounds() {
    let valid = SignupRequest {
        id: "heumsi".to_string(),
        name: "heumsi".to_string(),
        password: "1234".to_string(),
    };
    assert!(valid.validate().is_ok());

    let empty_id = SignupRequest {
        id: String::new(),
        ..valid.clone()
    };
    assert!(empty_id.validate().is_err());

    let long_id = SignupRequest {
        id: "x".repeat(51),
        ..valid.clone()
    };
    assert!(long_id.validate().is_err());

    let empty_password = SignupRequest {
        password: String::new(),
        ..valid
    };
    assert!(empty_password.validate().is_err());
}

#[test]
fn post_body_title_bounds() {
    let valid = PostBody {
        title: "first post".to_string(),
        content: "hello".to_string(),
    };
    assert!(valid.validate().is_ok());

    let empty_title = PostBody {
        title: String::new(),
        content: "hello".to_string(),
    };
    assert!(empty_title.validate().is_err());

    let long_title = PostBody {
        title: "t".repeat(101),
        content: "hello".to_string(),
    };
    assert!(long_title.validate().is_err());
}

#[test]
fn post_patch_validates_only_present_fields() {
    // Absent fields carry no constraints; a present empty title does.
    let absent = PostPatch {
        title: None,
        content: None,
    };
    assert!(absent.validate().is_ok());

    let bad_title = PostPatch {
        title: Some(String::new()),
        content: None,
    };
    assert!(bad_title.validate().is_err());
}

#[test]
fn post_patch_distinguishes_absent_from_present() {
    let patch: PostPatch = serde_json::from_str(r#"{"content": "new body"}"#).unwrap();
    assert!(patch.title.is_none());
    assert_eq!(patch.content.as_deref(), Some("new body"));
}

#[test]
fn comment_content_capped_at_300() {
    let valid = CreateCommentRequest {
        post_id: 1,
        content: "c".repeat(300),
    };
    assert!(valid.validate().is_ok());

    let too_long = CreateCommentRequest {
        post_id: 1,
        content: "c".repeat(301),
    };
    assert!(too_long.validate().is_err());
}

#[test]
fn comment_request_accepts_camel_case_post_id() {
    let req: CreateCommentRequest =
        serde_json::from_str(r#"{"postId": 3, "content": "nice"}"#).unwrap();
    assert_eq!(req.post_id, 3);
}

#[test]
fn page_params_default_and_cap() {
    let defaults: PageParams = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults.offset, 0);
    assert_eq!(defaults.limit, 100);
    assert!(defaults.validate().is_ok());

    let over_cap: PageParams = serde_json::from_str(r#"{"limit": 101}"#).unwrap();
    assert!(over_cap.validate().is_err());

    let negative: PageParams = serde_json::from_str(r#"{"offset": -1}"#).unwrap();
    assert!(negative.validate().is_err());
}
