#![no_main]
use libfuzzer_sys::fuzz_target;
use policyfox::Policy;

fuzz_target!(|data: &[u8]| {
    let Ok(policy) = Policy::parse(data) else {
        return;
    };

    let exposure = policy.exposure();
    for statement in policy.exposing_statements() {
        let _ = statement.summary(Some("123456789012"));
    }

    // What we print back must parse to the same verdict
    if let Ok(json) = policy.to_json() {
        let reparsed = Policy::from_json(&json).unwrap();
        assert_eq!(reparsed.exposure(), exposure);
    }
});
