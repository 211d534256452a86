//! Resource policy exposure - public and conditionally public classification
//!
//! Covers the shapes resource policies take in the wild: bare strings where
//! lists are allowed, `"Principal": "*"` versus `{"AWS": "*"}`, conditions
//! that do and do not pin an account or organization.

use policyfox::iam::Statement;
use policyfox::{ConditionBlock, Effect, Exposure, Policy, Principal};

fn classify(json: &str) -> Exposure {
    Policy::from_json(json).unwrap().exposure()
}

#[test]
fn test_public_bucket_policy() {
    let exposure = classify(
        r#"{
            "Version": "2012-10-17",
            "Statement": [{
                "Sid": "PublicRead",
                "Effect": "Allow",
                "Principal": "*",
                "Action": ["s3:GetObject", "s3:GetObjectVersion"],
                "Resource": "arn:aws:s3:::static-site/*"
            }]
        }"#,
    );
    assert_eq!(exposure, Exposure::Public);
}

#[test]
fn test_aws_wildcard_principal_is_public() {
    let exposure = classify(
        r#"{"Statement": {"Effect": "Allow", "Principal": {"AWS": ["arn:aws:iam::123456789012:root", "*"]},
            "Action": "sqs:SendMessage", "Resource": "*"}}"#,
    );
    assert_eq!(exposure, Exposure::Public);
}

#[test]
fn test_scoping_conditions_restrict() {
    let scoped = [
        r#"{"StringEquals": {"aws:SourceAccount": "123456789012"}}"#,
        r#"{"StringEquals": {"aws:SourceOwner": "123456789012"}}"#,
        r#"{"StringEquals": {"aws:PrincipalAccount": ["123456789012", "111122223333"]}}"#,
        r#"{"StringEquals": {"aws:PrincipalOrgID": "o-abc123"}}"#,
        r#"{"ArnEquals": {"aws:SourceArn": "arn:aws:sns:us-east-1:123456789012:alerts"}}"#,
        r#"{"ArnLike": {"aws:SourceArn": "arn:aws:s3:us-east-1:123456789012:*"}}"#,
    ];

    for condition in scoped {
        let json = format!(
            r#"{{"Statement": [{{"Effect": "Allow", "Principal": "*", "Action": "sqs:SendMessage",
                "Resource": "*", "Condition": {}}}]}}"#,
            condition
        );
        assert_eq!(classify(&json), Exposure::Restricted, "condition {}", condition);
    }
}

#[test]
fn test_unscoped_conditions_are_conditionally_public() {
    let unscoped = [
        r#"{"IpAddress": {"aws:SourceIp": "192.0.2.0/24"}}"#,
        r#"{"Bool": {"aws:SecureTransport": "true"}}"#,
        r#"{"Bool": {"aws:SecureTransport": true}}"#,
        r#"{"StringEquals": {"aws:SourceVpce": "vpce-1a2b3c4d"}}"#,
        r#"{"ArnLike": {"aws:SourceArn": "arn:aws:s3:::*"}}"#,
        r#"{"StringEqualsIfExists": {"aws:SourceAccount": "123456789012"}}"#,
    ];

    for condition in unscoped {
        let json = format!(
            r#"{{"Statement": [{{"Effect": "Allow", "Principal": "*", "Action": "sqs:SendMessage",
                "Resource": "*", "Condition": {}}}]}}"#,
            condition
        );
        assert_eq!(
            classify(&json),
            Exposure::ConditionallyPublic,
            "condition {}",
            condition
        );
    }
}

#[test]
fn test_deny_and_named_principals_are_restricted() {
    let exposure = classify(
        r#"{"Statement": [
            {"Effect": "Deny", "Principal": "*", "Action": "s3:*", "Resource": "*",
             "Condition": {"Bool": {"aws:SecureTransport": "false"}}},
            {"Effect": "Allow", "Principal": {"AWS": "arn:aws:iam::123456789012:role/app"},
             "Action": "s3:GetObject", "Resource": "arn:aws:s3:::data/*"},
            {"Effect": "Allow", "Principal": {"Service": "cloudtrail.amazonaws.com"},
             "Action": "s3:PutObject", "Resource": "arn:aws:s3:::trail/*"}
        ]}"#,
    );
    assert_eq!(exposure, Exposure::Restricted);
}

#[test]
fn test_empty_documents() {
    assert_eq!(classify("{}"), Exposure::Empty);
    assert_eq!(classify(r#"{"Statement": []}"#), Exposure::Empty);
    assert_eq!(
        classify(r#"{"Version": "2012-10-17", "Statement": []}"#),
        Exposure::Empty
    );
    assert_eq!(
        classify(r#"{"Version": "2012-10-17", "Id": "key-default-1"}"#),
        Exposure::Empty
    );
}

#[test]
fn test_malformed_documents_error() {
    assert!(Policy::from_json("").is_err());
    assert!(Policy::from_json("[]").is_err());
    assert!(Policy::from_json(r#"["2012-10-17"]"#).is_err());
    assert!(Policy::from_json(r#"{"Statement": [[]]}"#).is_err());
    assert!(Policy::from_json(r#"{"Statement": [{"Action": 42}]}"#).is_err());
    assert!(Policy::parse(b"\xff\xfe").is_err());
}

#[test]
fn test_built_policy_matches_parsed_policy() {
    let mut built = Policy::new();
    built.add_statement(
        Statement::new(Effect::Allow, ["sns:Publish"], ["arn:aws:sns:us-east-1:123456789012:alerts"])
            .with_principal(Principal::Wildcard)
            .with_condition(ConditionBlock::new().with(
                "StringEquals",
                "aws:SourceOwner",
                ["123456789012"],
            )),
    );

    let parsed = Policy::from_json(&built.to_json().unwrap()).unwrap();
    assert_eq!(parsed, built);
    assert_eq!(parsed.exposure(), Exposure::Restricted);
}

#[test]
fn test_action_and_resource_matching() {
    let policy = Policy::from_json(
        r#"{"Statement": [
            {"Effect": "Allow", "Principal": "*", "Action": "s3:Get*", "Resource": "arn:aws:s3:::site/*"},
            {"Effect": "Deny", "Principal": "*", "NotAction": "s3:GetObject", "Resource": "*"}
        ]}"#,
    )
    .unwrap();

    assert!(policy.has_matching_statement(Effect::Allow, "s3:GetObject", "arn:aws:s3:::site/index.html"));
    assert!(policy.has_matching_statement(Effect::Allow, "S3:GETOBJECTACL", "arn:aws:s3:::site/a"));
    assert!(!policy.has_matching_statement(Effect::Allow, "s3:PutObject", "arn:aws:s3:::site/a"));
    assert!(!policy.has_matching_statement(Effect::Allow, "s3:GetObject", "arn:aws:s3:::other/a"));

    assert!(policy.has_matching_statement(Effect::Deny, "s3:PutObject", "arn:aws:s3:::any"));
    assert!(!policy.has_matching_statement(Effect::Deny, "s3:GetObject", "arn:aws:s3:::any"));
}
