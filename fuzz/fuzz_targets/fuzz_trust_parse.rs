#![no_main]
use libfuzzer_sys::fuzz_target;
use policyfox::TrustPolicy;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(policy) = TrustPolicy::parse(text) {
        let analysis = policy.analyze();
        let _ = analysis.trusts_everyone();
        let _ = analysis.unrestricted_federation().count();
    }
});
