// ABOUTME: Tests for deployment state types and type state pattern.
// ABOUTME: Verifies state markers, transition signatures, and the summary type.

use std::mem::size_of;

use webapp_deploy::deploy::{
    Completed, DeploySummary, Deployment, Initialized, LogFetched, LogPersisted, Published,
    Reconciled, Stage,
};

// =============================================================================
// State Marker Type Tests
// =============================================================================

/// Test: The initial state carries no data.
#[test]
fn initial_state_is_zero_sized() {
    assert_eq!(
        size_of::<Initialized>(),
        0,
        "Initialized should be zero-sized"
    );
}

/// Test: Later states carry what earlier steps produced.
#[test]
fn later_states_hold_data() {
    assert!(size_of::<LogFetched>() > 0);
    assert!(size_of::<Published>() > 0);
    assert!(size_of::<Reconciled>() > 0);
    assert_eq!(size_of::<LogPersisted>(), size_of::<Completed>());
}

// =============================================================================
// Transition Type Signature Tests
// =============================================================================

/// Test: Verifies the type signatures of all transition methods compile correctly.
#[test]
fn transition_type_signatures_compile() {
    use webapp_deploy::cdn::CacheInvalidator;
    use webapp_deploy::deploy::{Clock, DeployError};
    use webapp_deploy::diagnostics::Diagnostics;
    use webapp_deploy::storage::ObjectStorage;

    // This function is never called, but it must compile.
    #[allow(dead_code)]
    async fn check_signatures(
        d0: Deployment<Initialized>,
        storage: &dyn ObjectStorage,
        invalidator: Option<&dyn CacheInvalidator>,
        clock: &dyn Clock,
        diag: &mut Diagnostics,
    ) {
        let d1: Result<Deployment<LogFetched>, DeployError> = d0.fetch_log(storage).await;
        let d2: Result<Deployment<Published>, DeployError> =
            d1.unwrap().publish(storage, clock, None, diag).await;
        let d3: Deployment<Reconciled> = d2.unwrap().reconcile(clock);
        let d4: Result<Deployment<LogPersisted>, DeployError> =
            d3.persist_log(storage, diag).await;
        let d5: Result<Deployment<Completed>, DeployError> =
            d4.unwrap().invalidate(invalidator, clock).await;
        let _summary: DeploySummary = d5.unwrap().finish();
    }
}

#[test]
fn stages_display_human_names() {
    assert_eq!(Stage::FetchingLog.to_string(), "fetching deployment log");
    assert_eq!(Stage::Invalidating.to_string(), "invalidating CDN cache");
}

#[test]
fn summary_defaults_to_nothing_done() {
    let summary = DeploySummary::default();
    assert_eq!(summary.uploaded, 0);
    assert!(!summary.invalidated);
}
