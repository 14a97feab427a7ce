use admission_gateway::{AdmissionConfig, AdmissionController, ConfigError, Decision};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn controller(limit: u32, window: Duration) -> Arc<AdmissionController> {
    AdmissionController::new(AdmissionConfig::new(limit, window, Duration::from_secs(3600))).unwrap()
}

#[tokio::test(start_paused = true)]
async fn limit_then_deny_then_fresh_window() {
    let rl = controller(3, Duration::from_secs(1));

    let first: Vec<Decision> = (0..3).map(|_| rl.admit("A")).collect();
    assert_eq!(first, vec![Decision::Allow; 3]);
    assert_eq!(rl.admit("A"), Decision::Deny);

    sleep(Duration::from_millis(1100)).await;
    assert_eq!(rl.admit("A"), Decision::Allow);
    assert_eq!(rl.request_count("A"), Some(1));
}

#[tokio::test]
async fn interleaved_clients_are_independent() {
    let rl = controller(5, Duration::from_secs(60));

    for _ in 0..5 {
        assert_eq!(rl.admit("A"), Decision::Allow);
        assert_eq!(rl.admit("B"), Decision::Allow);
    }
    assert_eq!(rl.admit("A"), Decision::Deny);
    assert_eq!(rl.admit("B"), Decision::Deny);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_for_one_client_are_all_counted() {
    let limit: u32 = 64;
    let rl = controller(limit, Duration::from_secs(60));

    let mut handles = Vec::with_capacity(limit as usize);
    for _ in 0..limit {
        let rl = rl.clone();
        handles.push(tokio::spawn(async move { rl.admit("contended") }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap().is_allowed() {
            allowed += 1;
        }
    }

    assert_eq!(allowed, limit);
    assert_eq!(rl.request_count("contended"), Some(u64::from(limit)));
    assert_eq!(rl.admit("contended"), Decision::Deny);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_clients_do_not_interfere() {
    let rl = controller(20, Duration::from_secs(60));
    let keys: Vec<String> = (0..8).map(|i| format!("client-{i}")).collect();

    let mut handles = Vec::new();
    for _ in 0..20 {
        for key in &keys {
            let rl = rl.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move { rl.admit(&key) }));
        }
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Decision::Allow);
    }

    for key in &keys {
        assert_eq!(rl.request_count(key), Some(20));
        assert_eq!(rl.admit(key), Decision::Deny);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn admit_works_from_plain_threads() {
    let rl = controller(200, Duration::from_secs(60));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let rl = &rl;
            scope.spawn(move || {
                for _ in 0..25 {
                    assert_eq!(rl.admit("threaded"), Decision::Allow);
                }
            });
        }
    });

    assert_eq!(rl.request_count("threaded"), Some(200));
}

#[tokio::test(start_paused = true)]
async fn one_shot_clients_do_not_accumulate() {
    let config = AdmissionConfig::new(10, Duration::from_secs(1), Duration::from_secs(2));
    let rl = AdmissionController::new(config).unwrap();

    for i in 0..1000 {
        assert_eq!(rl.admit(&format!("10.0.{}.{}", i / 256, i % 256)), Decision::Allow);
    }
    assert_eq!(rl.tracked_clients(), 1000);

    sleep(Duration::from_millis(4500)).await;
    assert_eq!(rl.tracked_clients(), 0);
}

#[tokio::test(start_paused = true)]
async fn busy_client_survives_sweeps() {
    let config = AdmissionConfig::new(100, Duration::from_secs(1), Duration::from_millis(1700));
    let rl = AdmissionController::new(config).unwrap();

    // One request every 400ms keeps the window non-empty at each sweep
    for _ in 0..10 {
        rl.admit("steady");
        sleep(Duration::from_millis(400)).await;
    }
    assert_eq!(rl.tracked_clients(), 1);
}

#[tokio::test]
async fn rejects_degenerate_configuration() {
    let window = Duration::from_secs(1);
    let sweep = Duration::from_secs(1);

    let err = AdmissionController::new(AdmissionConfig::new(0, window, sweep)).err();
    assert_eq!(err, Some(ConfigError::ZeroLimit));

    let err = AdmissionController::new(AdmissionConfig::new(1, Duration::ZERO, sweep)).err();
    assert_eq!(err, Some(ConfigError::ZeroWindow));

    let err = AdmissionController::new(AdmissionConfig::new(1, window, Duration::ZERO)).err();
    assert_eq!(err, Some(ConfigError::ZeroSweepInterval));
}

#[tokio::test]
async fn rejects_periods_too_long_to_schedule() {
    let config = AdmissionConfig::new(5, Duration::from_millis(1), Duration::from_secs(u64::MAX));
    assert!(matches!(
        AdmissionController::new(config).err(),
        Some(ConfigError::SweepIntervalTooLong { .. })
    ));

    let config = AdmissionConfig::new(5, Duration::from_secs(u64::MAX), Duration::from_secs(1));
    assert!(matches!(
        AdmissionController::new(config).err(),
        Some(ConfigError::WindowTooLong { .. })
    ));
}

#[test]
fn requires_a_runtime() {
    let config = AdmissionConfig::new(1, Duration::from_secs(1), Duration::from_secs(1));
    assert_eq!(AdmissionController::new(config).err(), Some(ConfigError::NoRuntime));
}
