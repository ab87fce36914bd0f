use async_trait::async_trait;
use panel_framework::mock::MockScene;
use panel_framework::{
    HookKind, LoadError, NodeRef, Panel, PanelError, PanelKind, PanelRuntime, PanelSpec, PanelState,
    SceneNode, Size, Transition, Vec3,
};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

// --- Test Panel ---

#[derive(Debug, thiserror::Error)]
#[error("{0} hook failed")]
struct ProbeError(&'static str);

/// Shared record of every hook call, injected as the panel context.
#[derive(Default)]
struct Probe {
    events: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    open_gate: Mutex<Option<Arc<Semaphore>>>,
    open_entered: Notify,
}

impl Probe {
    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn check(&self, hook: &'static str) -> Result<(), ProbeError> {
        if self.failing.lock().unwrap().contains(hook) {
            return Err(ProbeError(hook));
        }
        Ok(())
    }

    fn fail(&self, hook: &'static str) {
        self.failing.lock().unwrap().insert(hook);
    }

    fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, hook: &str) -> usize {
        self.events().iter().filter(|e| e.split(':').next() == Some(hook)).count()
    }

    fn gate_opens(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.open_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

struct Recorder<M> {
    node: NodeRef,
    _marker: PhantomData<M>,
}

#[async_trait]
impl<M: Send + Sync + 'static> Panel for Recorder<M> {
    type Context = Arc<Probe>;
    type OpenParams = &'static str;
    type CloseParams = &'static str;
    type Error = ProbeError;

    fn attach(node: &NodeRef, _probe: &Arc<Probe>) -> Result<Self, Self::Error> {
        Ok(Self {
            node: node.clone(),
            _marker: PhantomData,
        })
    }

    async fn on_create(&mut self, probe: &Arc<Probe>) -> Result<(), Self::Error> {
        probe.record(format!("create:{}", self.node.id()));
        probe.check("create")
    }

    async fn on_open(&mut self, params: &'static str, probe: &Arc<Probe>) -> Result<(), Self::Error> {
        assert!(self.node.is_active(), "node must be active before on_open");
        probe.record(format!("open:{params}"));
        probe.open_entered.notify_one();
        if probe.check("crash").is_err() {
            panic!("open hook crashed");
        }

        let gate = probe.open_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        probe.check("open")
    }

    async fn on_close(&mut self, params: &'static str, probe: &Arc<Probe>) -> Result<(), Self::Error> {
        assert!(self.node.is_active(), "node must still be active during on_close");
        probe.record(format!("close:{params}"));
        probe.check("close")
    }
}

struct A;
struct B;

type PanelA = Recorder<A>;
type PanelB = Recorder<B>;

fn setup() -> (Arc<MockScene>, PanelRuntime, NodeRef) {
    let scene = MockScene::with_viewport(Size::new(800.0, 600.0));
    let runtime = PanelRuntime::new(scene.clone(), scene.clone());
    let root = scene.root();
    runtime.init(root.clone()).unwrap();
    (scene, runtime, root)
}

// --- Tests ---

#[tokio::test]
async fn test_new_panel_full_scenario() {
    let (scene, mut runtime, root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a").kind(PanelKind::New), probe.clone())
        .unwrap();

    // 1. First open creates and opens once
    let result = runtime.open_panel::<PanelA>("first").await.unwrap();
    assert_eq!(result, Transition::Applied);
    assert_eq!(probe.count("create"), 1);
    assert_eq!(probe.count("open"), 1);

    let snapshot = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(snapshot.state, PanelState::Open);
    assert_eq!(snapshot.node_active, Some(true));
    assert_eq!(snapshot.z_index, Some(1));

    let node = scene.node(snapshot.node_id.unwrap()).unwrap();
    assert_eq!(node.parent_id(), Some(root.id()));
    assert_eq!(node.position(), Vec3::ZERO);
    assert_eq!(node.size(), Size::new(800.0, 600.0));
    assert_eq!(node.prefab(), Some("prefab/a"));

    // 2. Second open is a no-op
    let result = runtime.open_panel::<PanelA>("again").await.unwrap();
    assert_eq!(result, Transition::Rejected);
    assert_eq!(probe.count("create"), 1);
    assert_eq!(probe.count("open"), 1);
    assert_eq!(runtime.snapshot::<PanelA>().await.unwrap(), snapshot);

    // 3. Close destroys the node and drops the instance
    let result = runtime.close_panel::<PanelA>("bye").await.unwrap();
    assert_eq!(result, Transition::Applied);
    assert_eq!(probe.count("close"), 1);
    assert!(node.is_destroyed());

    let closed = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(closed.state, PanelState::Close);
    assert!(!closed.has_instance());
    assert!(closed.resource_loaded);

    // 4. Reopen creates a fresh instance with the next draw order
    runtime.open_panel::<PanelA>("reopen").await.unwrap();
    assert_eq!(probe.count("create"), 2);
    let reopened = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(reopened.z_index, Some(2));
    assert_ne!(reopened.node_id, snapshot.node_id);
    assert_eq!(scene.load_count_for("prefab/a"), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_old_panel_is_hidden_and_reused() {
    let (scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelB>(PanelSpec::new("prefab/b").kind(PanelKind::Old), probe.clone())
        .unwrap();

    runtime.open_panel::<PanelB>("one").await.unwrap();
    let first = runtime.snapshot::<PanelB>().await.unwrap();

    runtime.close_panel::<PanelB>("hide").await.unwrap();
    let hidden = runtime.snapshot::<PanelB>().await.unwrap();
    assert_eq!(hidden.state, PanelState::Close);
    assert_eq!(hidden.node_id, first.node_id);
    assert_eq!(hidden.node_active, Some(false));
    let node = scene.node(first.node_id.unwrap()).unwrap();
    assert!(!node.is_destroyed());

    runtime.open_panel::<PanelB>("two").await.unwrap();
    let shown = runtime.snapshot::<PanelB>().await.unwrap();
    assert_eq!(shown.node_id, first.node_id);
    assert_eq!(shown.node_active, Some(true));
    assert_eq!(shown.z_index, Some(2));

    assert_eq!(probe.count("create"), 1);
    assert_eq!(probe.count("open"), 2);
    assert_eq!(scene.instantiate_count(), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_close_when_closed_is_noop() {
    let (_scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), probe.clone())
        .unwrap();

    let result = runtime.close_panel::<PanelA>("early").await.unwrap();
    assert_eq!(result, Transition::Rejected);
    assert_eq!(probe.count("close"), 0);

    runtime.open_panel::<PanelA>("x").await.unwrap();
    runtime.close_panel::<PanelA>("once").await.unwrap();
    let result = runtime.close_panel::<PanelA>("twice").await.unwrap();
    assert_eq!(result, Transition::Rejected);
    assert_eq!(probe.count("close"), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_draw_order_increases_across_panels() {
    let (_scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a").kind(PanelKind::New), probe.clone())
        .unwrap();
    runtime
        .register::<PanelB>(PanelSpec::new("prefab/b").z_index_base(100), probe.clone())
        .unwrap();

    let mut orders = Vec::new();
    runtime.open_panel::<PanelA>("a1").await.unwrap();
    orders.push(runtime.snapshot::<PanelA>().await.unwrap().z_index.unwrap());
    runtime.open_panel::<PanelB>("b1").await.unwrap();
    orders.push(runtime.snapshot::<PanelB>().await.unwrap().z_index.unwrap() - 100);
    runtime.close_panel::<PanelA>("a").await.unwrap();
    // Rejected opens do not consume a draw order
    runtime.open_panel::<PanelB>("b-dup").await.unwrap();
    runtime.open_panel::<PanelA>("a2").await.unwrap();
    orders.push(runtime.snapshot::<PanelA>().await.unwrap().z_index.unwrap());
    runtime.close_panel::<PanelB>("b").await.unwrap();
    runtime.open_panel::<PanelB>("b2").await.unwrap();
    orders.push(runtime.snapshot::<PanelB>().await.unwrap().z_index.unwrap() - 100);

    assert_eq!(orders, vec![1, 2, 3, 4]);
    assert_eq!(runtime.stage().current_draw_order(), 4);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_pre_panel_loads_once() {
    let (scene, mut runtime, _root) = setup();
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), Arc::new(Probe::default()))
        .unwrap();

    runtime.pre_panel::<PanelA>().await.unwrap();
    runtime.pre_panel::<PanelA>().await.unwrap();
    assert_eq!(scene.load_count_for("prefab/a"), 1);
    assert_eq!(scene.instantiate_count(), 0);
    assert!(runtime.snapshot::<PanelA>().await.unwrap().resource_loaded);

    runtime.open_panel::<PanelA>("x").await.unwrap();
    assert_eq!(scene.load_count_for("prefab/a"), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_pre_panel_loads_once() {
    let (scene, mut runtime, _root) = setup();
    let client = runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), Arc::new(Probe::default()))
        .unwrap();
    scene.gate_loads();

    let mut handles = vec![];
    for _ in 0..5 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.preload().await }));
    }
    scene.release_loads(1);

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(scene.load_count(), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_load_failure_propagates_and_rolls_back() {
    let (scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/missing").kind(PanelKind::New), probe.clone())
        .unwrap();
    scene.fail_load("prefab/missing");

    let err = runtime.pre_panel::<PanelA>().await.unwrap_err();
    assert!(matches!(err, PanelError::Load { source: LoadError::NotFound(_), .. }));

    let err = runtime.open_panel::<PanelA>("x").await.unwrap_err();
    match err {
        PanelError::Load { path, .. } => assert_eq!(path, "prefab/missing"),
        other => panic!("unexpected error: {other}"),
    }
    let snapshot = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(snapshot.state, PanelState::Close);
    assert!(!snapshot.resource_loaded);
    assert!(!snapshot.has_instance());
    assert_eq!(probe.count("open"), 0);

    // No retry inside the runtime: the next call loads again and succeeds.
    scene.clear_failures();
    runtime.open_panel::<PanelA>("x").await.unwrap();
    let snapshot = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(snapshot.state, PanelState::Open);
    // The draw order consumed by the failed open is not reused.
    assert_eq!(snapshot.z_index, Some(2));
    assert_eq!(scene.load_count_for("prefab/missing"), 3);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_instantiate_failure_rolls_back() {
    let (scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), probe.clone())
        .unwrap();
    scene.fail_instantiate(true);

    let err = runtime.open_panel::<PanelA>("x").await.unwrap_err();
    assert!(matches!(err, PanelError::Scene(_)));
    assert_eq!(runtime.snapshot::<PanelA>().await.unwrap().state, PanelState::Close);
    assert_eq!(probe.count("create"), 0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_create_hook_failure_destroys_node() {
    let (scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a").kind(PanelKind::Old), probe.clone())
        .unwrap();
    probe.fail("create");

    let err = runtime.open_panel::<PanelA>("x").await.unwrap_err();
    assert_eq!(err.failed_hook(), Some(HookKind::Create));
    assert!(scene.live_nodes().is_empty());
    let snapshot = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(snapshot.state, PanelState::Close);
    assert!(!snapshot.has_instance());

    probe.heal();
    runtime.open_panel::<PanelA>("x").await.unwrap();
    assert_eq!(probe.count("create"), 2);
    assert_eq!(probe.count("open"), 1);
    assert_eq!(scene.live_nodes().len(), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_open_hook_failure_leaves_panel_open() {
    let (_scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a").kind(PanelKind::New), probe.clone())
        .unwrap();
    probe.fail("open");

    let err = runtime.open_panel::<PanelA>("x").await.unwrap_err();
    assert_eq!(err.failed_hook(), Some(HookKind::Open));
    let snapshot = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(snapshot.state, PanelState::Open);
    assert_eq!(snapshot.node_active, Some(true));

    probe.heal();
    let result = runtime.close_panel::<PanelA>("recover").await.unwrap();
    assert_eq!(result, Transition::Applied);
    assert!(!runtime.snapshot::<PanelA>().await.unwrap().has_instance());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_close_hook_failure_still_tears_down() {
    let (scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a").kind(PanelKind::New), probe.clone())
        .unwrap();

    runtime.open_panel::<PanelA>("x").await.unwrap();
    probe.fail("close");

    let err = runtime.close_panel::<PanelA>("x").await.unwrap_err();
    assert_eq!(err.failed_hook(), Some(HookKind::Close));
    let snapshot = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(snapshot.state, PanelState::Close);
    assert!(!snapshot.has_instance());
    assert!(scene.live_nodes().is_empty());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_old_panel_close_hook_failure_still_hides() {
    let (scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelB>(PanelSpec::new("prefab/b").kind(PanelKind::Old), probe.clone())
        .unwrap();

    runtime.open_panel::<PanelB>("x").await.unwrap();
    let opened = runtime.snapshot::<PanelB>().await.unwrap();
    probe.fail("close");

    let err = runtime.close_panel::<PanelB>("x").await.unwrap_err();
    assert_eq!(err.failed_hook(), Some(HookKind::Close));
    let snapshot = runtime.snapshot::<PanelB>().await.unwrap();
    assert_eq!(snapshot.state, PanelState::Close);
    assert_eq!(snapshot.node_id, opened.node_id);
    assert_eq!(snapshot.node_active, Some(false));
    let node = scene.node(opened.node_id.unwrap()).unwrap();
    assert!(!node.is_destroyed());

    // The kept instance is reused on the next open
    probe.heal();
    runtime.open_panel::<PanelB>("y").await.unwrap();
    assert_eq!(runtime.snapshot::<PanelB>().await.unwrap().node_id, opened.node_id);
    assert_eq!(probe.count("create"), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_z_index_overflow_is_reported_and_rolled_back() {
    let (scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(
            PanelSpec::new("prefab/a").kind(PanelKind::New).z_index_base(i64::MAX),
            probe.clone(),
        )
        .unwrap();
    runtime
        .register::<PanelB>(PanelSpec::new("prefab/b"), probe.clone())
        .unwrap();

    let err = runtime.open_panel::<PanelA>("x").await.unwrap_err();
    match err {
        PanelError::ZIndexOverflow { panel, order, base } => {
            assert_eq!(panel, "Recorder<A>");
            assert_eq!(order, 1);
            assert_eq!(base, i64::MAX);
        }
        other => panic!("unexpected error: {other}"),
    }

    // The actor survives and the panel stays closed
    let snapshot = runtime.snapshot::<PanelA>().await.unwrap();
    assert_eq!(snapshot.state, PanelState::Close);
    assert!(!snapshot.has_instance());
    assert!(scene.live_nodes().is_empty());
    assert_eq!(probe.count("open"), 0);
    assert_eq!(
        runtime.close_panel::<PanelA>("x").await.unwrap(),
        Transition::Rejected
    );

    runtime.open_panel::<PanelB>("y").await.unwrap();
    assert_eq!(runtime.snapshot::<PanelB>().await.unwrap().z_index, Some(2));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_hook_errors_name_the_panel_type() {
    let (_scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelB>(PanelSpec::new("prefab/b"), probe.clone())
        .unwrap();
    probe.fail("create");

    let err = runtime.open_panel::<PanelB>("x").await.unwrap_err();
    match err {
        PanelError::Hook { panel, hook, .. } => {
            assert_eq!(panel, "Recorder<B>");
            assert_eq!(hook, HookKind::Create);
        }
        other => panic!("unexpected error: {other}"),
    }

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_open_before_init_fails_without_side_effects() {
    let scene = MockScene::new();
    let mut runtime = PanelRuntime::new(scene.clone(), scene.clone());
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), probe.clone())
        .unwrap();
    assert!(!runtime.is_initialized());

    let err = runtime.open_panel::<PanelA>("x").await.unwrap_err();
    assert!(matches!(err, PanelError::NotInitialized));
    assert_eq!(runtime.snapshot::<PanelA>().await.unwrap().state, PanelState::Close);
    assert_eq!(scene.load_count(), 0);
    assert_eq!(runtime.stage().current_draw_order(), 0);

    runtime.init(scene.root()).unwrap();
    assert!(matches!(runtime.init(scene.root()), Err(PanelError::AlreadyInitialized)));
    runtime.open_panel::<PanelA>("x").await.unwrap();
    assert_eq!(runtime.snapshot::<PanelA>().await.unwrap().z_index, Some(1));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_registration_errors() {
    let (_scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), probe.clone())
        .unwrap();

    let err = runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), probe.clone())
        .unwrap_err();
    assert!(matches!(err, PanelError::AlreadyRegistered(_)));

    assert!(runtime.is_registered::<PanelA>());
    assert!(!runtime.is_registered::<PanelB>());
    let err = runtime.open_panel::<PanelB>("x").await.unwrap_err();
    assert!(matches!(err, PanelError::NotRegistered(_)));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_requests_wait_for_pending_open() {
    let (_scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    let gate = probe.gate_opens();
    let client = runtime
        .register::<PanelA>(PanelSpec::new("prefab/a").kind(PanelKind::New), probe.clone())
        .unwrap();

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.open("first").await }
    });
    probe.open_entered.notified().await;

    // The open hook is now suspended. Queue a second open and a close behind it.
    gate.add_permits(1);
    let (second, close) = tokio::join!(client.open("second"), client.close("bye"));

    assert_eq!(first.await.unwrap().unwrap(), Transition::Applied);
    assert_eq!(second.unwrap(), Transition::Rejected);
    assert_eq!(close.unwrap(), Transition::Applied);
    assert_eq!(probe.events()[1..], ["open:first".to_string(), "close:bye".to_string()]);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_racing_opens_apply_once() {
    let (_scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    let client = runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), probe.clone())
        .unwrap();

    let mut handles = vec![];
    for _ in 0..10 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.open("race").await }));
    }

    let mut applied = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_applied() {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
    assert_eq!(probe.count("create"), 1);
    assert_eq!(probe.count("open"), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_waits_for_every_actor_after_a_crash() {
    let (_scene, mut runtime, _root) = setup();
    let probe = Arc::new(Probe::default());
    let crashing = runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), probe.clone())
        .unwrap();
    let healthy = runtime
        .register::<PanelB>(PanelSpec::new("prefab/b"), Arc::new(Probe::default()))
        .unwrap();
    probe.fail("crash");

    let err = crashing.open("boom").await.unwrap_err();
    assert!(matches!(err, PanelError::ActorDropped));

    let err = runtime.shutdown().await.unwrap_err();
    assert!(matches!(err, PanelError::ShutdownFailed(_)));

    // The healthy actor was stopped and joined before shutdown returned
    let err = healthy.open("late").await.unwrap_err();
    assert!(matches!(err, PanelError::ActorClosed));
}

#[tokio::test]
async fn test_clients_fail_after_shutdown() {
    let (_scene, mut runtime, _root) = setup();
    let client = runtime
        .register::<PanelA>(PanelSpec::new("prefab/a"), Arc::new(Probe::default()))
        .unwrap();

    runtime.shutdown().await.unwrap();
    let err = client.open("late").await.unwrap_err();
    assert!(matches!(err, PanelError::ActorClosed));
}
