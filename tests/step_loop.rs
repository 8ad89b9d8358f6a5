mod common;

use std::time::Duration;

use common::{MockBackend, SCENE, config};
use realenv::runtime::{ChannelError, Shutdown};
use realenv::synthetic::{SyntheticBackend, SyntheticDataset};
use realenv::{AsyncEnv, BlockingEnv, Env, EnvConfig, EnvError, Lifecycle, SimpleEnv};

fn synthetic() -> SyntheticBackend {
    SyntheticBackend::new(SyntheticDataset::new([SCENE]))
}

#[tokio::test]
async fn three_noop_steps() {
    let config = EnvConfig {
        debug: true,
        ..config()
    };
    let mut env = SimpleEnv::new(config, synthetic()).await.unwrap();

    let mut rewards = Vec::new();
    for i in 0..3 {
        let (frame, reward, done, info) = env.step(Vec::new()).await.unwrap();
        assert!(!done);
        assert_eq!(frame.dimensions(), (32, 24));
        assert_eq!(info.state_old.is_none(), i == 0);
        rewards.push(reward);
    }

    assert!(env.visuals().renderer().is_onscreen());
    assert_eq!(rewards[0], 0.0);
    assert!(rewards.iter().all(|r| r.is_finite()));
    env.teardown().await;
}

#[tokio::test]
async fn reward_follows_distance_deltas() {
    let mut backend = MockBackend::new();
    backend.distances = vec![4.0, 3.0, 3.5, 3.5];
    let mut env = SimpleEnv::new(config(), backend).await.unwrap();

    let mut rewards = Vec::new();
    let mut infos = Vec::new();
    for _ in 0..4 {
        let (_, reward, _, info) = env.step(()).await.unwrap();
        rewards.push(reward);
        infos.push(info);
    }

    assert_eq!(rewards, [0.0, 5.0, -2.5, 0.0]);
    assert_eq!(infos[1].state_old, Some(4.0));
    assert_eq!(infos[1].state_new, 3.0);
    assert_eq!(env.state_old().map(|s| s.distance_to_target), Some(3.5));
    env.teardown().await;
}

#[tokio::test]
async fn done_is_never_signalled() {
    let mut backend = MockBackend::new();
    backend.distances = (0..20).map(|i| 10.0 - f64::from(i) * 0.5).collect();
    let mut env = SimpleEnv::new(config(), backend).await.unwrap();

    for _ in 0..20 {
        let (_, _, done, _) = env.step(()).await.unwrap();
        assert!(!done);
    }
    assert_eq!(env.steps(), 20);
    env.teardown().await;
}

#[tokio::test]
async fn physics_failure_ends_environment() {
    let mut backend = MockBackend::new();
    backend.fail_on_step = Some(2);
    let mut env = SimpleEnv::new(config(), backend).await.unwrap();

    env.step(()).await.unwrap();
    let err = env.step(()).await.unwrap_err();
    assert!(matches!(err, EnvError::Physics(_)));
    assert!(err.to_string().contains("engine fault on step 2"));

    assert_eq!(env.lifecycle(), Lifecycle::Ended);
    assert!(env.worker().is_stopped());
    assert!(matches!(env.step(()).await, Err(EnvError::Ended)));
    assert_eq!(env.teardown().await, Shutdown::AlreadyStopped);
}

#[tokio::test]
async fn stalled_worker_fails_the_step() {
    let mut config = config();
    // one reply for the initial pose, one for the first step
    config.worker.args = vec!["--stall-after".into(), "2".into()];
    config.worker.reply_timeout_ms = 200;
    let mut env = SimpleEnv::new(config, MockBackend::new()).await.unwrap();

    env.step(()).await.unwrap();
    let err = env.step(()).await.unwrap_err();
    assert!(matches!(err, EnvError::Channel(ChannelError::Timeout(_))));
    assert_eq!(env.lifecycle(), Lifecycle::Ended);
    assert!(env.worker().is_stopped());
}

#[tokio::test]
async fn cancelled_step_ends_environment() {
    let mut config = config();
    // only the initial pose is answered
    config.worker.args = vec!["--stall-after".into(), "1".into()];
    config.worker.reply_timeout_ms = 5_000;
    let mut backend = MockBackend::new();
    backend.distances = vec![4.0];
    let mut env = SimpleEnv::new(config, backend).await.unwrap();

    let cancelled = tokio::time::timeout(Duration::from_millis(200), env.step(())).await;
    assert!(cancelled.is_err());
    assert_eq!(env.lifecycle(), Lifecycle::Stepping);
    assert!(env.state_old().is_none());
    assert_eq!(env.steps(), 0);

    assert!(matches!(env.step(()).await, Err(EnvError::Ended)));
    assert_eq!(env.lifecycle(), Lifecycle::Ended);
    assert!(env.worker().is_stopped());
    assert_eq!(env.teardown().await, Shutdown::AlreadyStopped);
}

#[tokio::test]
async fn frames_follow_scale_factor() {
    let config = EnvConfig {
        scale_up: 2.0,
        ..config()
    };
    let mut env = SimpleEnv::new(config, synthetic()).await.unwrap();
    assert!(
        env.visuals()
            .scene()
            .targets
            .iter()
            .all(|t| t.dimensions() == (16, 12))
    );

    let (frame, _, _, _) = env.step(vec![0.1, 0.0, 0.0]).await.unwrap();
    assert_eq!(frame.dimensions(), (16, 12));
    env.teardown().await;
}

#[tokio::test]
async fn environments_coexist_on_separate_ports() {
    let mut first = SimpleEnv::new(config(), MockBackend::new()).await.unwrap();
    let mut second = SimpleEnv::new(config(), MockBackend::new()).await.unwrap();
    assert_ne!(
        first.worker().endpoints().depth_port,
        second.worker().endpoints().depth_port
    );
    assert_ne!(first.id(), second.id());

    first.step(()).await.unwrap();
    second.step(()).await.unwrap();
    first.teardown().await;
    second.step(()).await.unwrap();
    second.teardown().await;
}

#[tokio::test]
async fn async_contract_delegates_to_core() {
    let mut env = SimpleEnv::new(config(), MockBackend::new()).await.unwrap();

    AsyncEnv::reset(&mut env).await.unwrap();
    AsyncEnv::render(&mut env).await.unwrap();
    let (_, reward, done, _) = AsyncEnv::step(&mut env, ()).await.unwrap();
    assert_eq!((reward, done), (0.0, false));

    AsyncEnv::close(&mut env).await.unwrap();
    AsyncEnv::close(&mut env).await.unwrap();
    assert_eq!(env.lifecycle(), Lifecycle::Ended);
}

#[test]
fn blocking_env_runs_outside_a_runtime() {
    let mut env = BlockingEnv::new(|| SimpleEnv::new(config(), synthetic())).unwrap();

    let (_, first, _, _) = env.step(vec![-1.0, 0.0, 0.0]).unwrap();
    let (_, second, done, info) = env.step(vec![-1.0, 0.0, 0.0]).unwrap();
    assert_eq!(first, 0.0);
    // moving toward the target at the origin shrinks the distance
    assert!(second > 0.0);
    assert!(!done);
    assert!(info.state_old.unwrap() > info.state_new);

    env.close().unwrap();
    assert_eq!(env.get_ref().lifecycle(), Lifecycle::Ended);
}
