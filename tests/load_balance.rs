mod common;

use lbprobe::{
    core::{tabulate, verify},
    tcp::client::sample,
};

#[tokio::test]
async fn round_robin_over_four_backends() {
    common::init_tracing();

    let backends = common::spawn_identity_servers(4).await;
    let balancer = common::spawn_round_robin_balancer(backends.addrs().to_vec()).await;
    let target = common::local_target(balancer);

    let samples = sample(&target, 20).await.unwrap();
    assert_eq!(samples.len(), 20);
    for (index, sample) in samples.iter().enumerate() {
        assert_eq!(sample.iteration, index);
        assert!(
            backends.identities().contains(&sample.responder_identity),
            "unexpected responder: {}",
            sample.responder_identity
        );
    }

    let distribution = tabulate(&samples);
    assert_eq!(distribution.total(), 20);

    // a balancer may skip a replica within 20 connections,
    // so only require most of them to have answered
    let verdict = verify(&distribution, 4);
    assert!(verdict.distinct_at_least(3), "{verdict}");
}

#[tokio::test]
async fn single_backend_is_detected() {
    common::init_tracing();

    let backends = common::spawn_identity_servers(1).await;
    let target = common::local_target(backends.addrs()[0]);

    let samples = sample(&target, 5).await.unwrap();
    let distribution = tabulate(&samples);
    assert_eq!(distribution.count(&backends.identities()[0]), 5);

    let verdict = verify(&distribution, 4);
    assert!(!verdict.pass);
    assert_eq!(verdict.distinct_responder_count, 1);
    assert_eq!(verdict.total_samples, 5);
}
