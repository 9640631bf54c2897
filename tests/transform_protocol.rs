//! End-to-end tests of the transform combinator over the full protocol:
//! bind, start, completion, queries, drivers and tracing.

mod common;

use asend::invoke::Invoke;
use asend::types::TypeNames;
use asend::{
    async_trace, connect, just, just_done, just_error, on_new_thread, sync_wait, sync_wait_with,
    CapturedError, Cons, Connect, DomainErrors, ErrorKind, ErrorKinds, ErrorReceiver,
    OperationState, Outcome, Query, Queryable, Receiver, Sender, SenderExt, StopSource,
    TransformReceiver, TypeList, ValueReceiver, WaitConfig, WithCaptured, Nil,
};
use common::*;
use std::marker::PhantomData;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct IoFault(u8);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
    Io(IoFault),
    Captured(String),
}

impl From<IoFault> for Failure {
    fn from(fault: IoFault) -> Self {
        Self::Io(fault)
    }
}

impl From<CapturedError> for Failure {
    fn from(err: CapturedError) -> Self {
        Self::Captured(err.to_string())
    }
}

/// Completes with one of two shapes, or a domain error.
#[derive(Debug, Clone, Copy)]
enum TwoShapes {
    Number(i32),
    Pair(u8),
    Fault(u8),
}

impl Sender for TwoShapes {
    type Values = Cons<i32, Cons<(String, u8), Nil>>;
    type Errors = DomainErrors<Cons<IoFault, Nil>>;
}

struct TwoShapesOperation<R> {
    script: TwoShapes,
    receiver: Option<R>,
}

impl<R> Connect<R> for TwoShapes
where
    R: ValueReceiver<i32> + ValueReceiver<(String, u8)> + ErrorReceiver<IoFault>,
{
    type Operation = TwoShapesOperation<R>;

    fn connect(self, receiver: R) -> Self::Operation {
        TwoShapesOperation {
            script: self,
            receiver: Some(receiver),
        }
    }
}

impl<R> Connect<R> for &TwoShapes
where
    R: ValueReceiver<i32> + ValueReceiver<(String, u8)> + ErrorReceiver<IoFault>,
{
    type Operation = TwoShapesOperation<R>;

    fn connect(self, receiver: R) -> Self::Operation {
        <TwoShapes as Connect<R>>::connect(*self, receiver)
    }
}

impl<R> OperationState for TwoShapesOperation<R>
where
    R: ValueReceiver<i32> + ValueReceiver<(String, u8)> + ErrorReceiver<IoFault>,
{
    fn start(&mut self) {
        let Some(receiver) = self.receiver.take() else {
            return;
        };
        match self.script {
            TwoShapes::Number(n) => ValueReceiver::<i32>::set_value(receiver, n),
            TwoShapes::Pair(b) => {
                ValueReceiver::<(String, u8)>::set_value(receiver, (String::from("pair"), b));
            }
            TwoShapes::Fault(code) => receiver.set_error(IoFault(code)),
        }
    }
}

/// Handles both shapes of [`TwoShapes`].
#[derive(Clone, Copy)]
struct Render;

impl Invoke<i32> for Render {
    type Output = String;

    fn invoke(self, n: i32) -> Result<String, CapturedError> {
        Ok(format!("n={n}"))
    }
}

impl Invoke<(String, u8)> for Render {
    type Output = String;

    fn invoke(self, (name, b): (String, u8)) -> Result<String, CapturedError> {
        if b == 0 {
            return Err(CapturedError::from_panic_message("zero byte"));
        }
        Ok(format!("{name}={b}"))
    }
}

impl Invoke<i32> for &Render {
    type Output = String;

    fn invoke(self, n: i32) -> Result<String, CapturedError> {
        (*self).invoke(n)
    }
}

impl Invoke<(String, u8)> for &Render {
    type Output = String;

    fn invoke(self, pair: (String, u8)) -> Result<String, CapturedError> {
        (*self).invoke(pair)
    }
}

#[test]
fn multi_shape_predecessor_maps_each_shape() {
    init_test_logging();
    test_phase!("multi_shape_predecessor_maps_each_shape");

    let cases = [
        (TwoShapes::Number(3), Fired::Value("n=3".to_string())),
        (TwoShapes::Pair(9), Fired::Value("pair=9".to_string())),
        (TwoShapes::Fault(4), Fired::Error(Failure::Io(IoFault(4)))),
        (
            TwoShapes::Pair(0),
            Fired::Error(Failure::Captured("panic: zero byte".to_string())),
        ),
    ];
    for (script, expected) in cases {
        let (probe, log) = Probe::<String, Failure>::new();
        let mut op = connect(script.transform(Render), probe);
        op.start();
        assert_eq!(log.single(), expected, "script {script:?}");
    }
    test_complete!("multi_shape_predecessor_maps_each_shape");
}

#[test]
fn multi_shape_declared_sets() {
    type Mapped = asend::Transform<TwoShapes, Render>;
    assert_same_type(
        PhantomData::<<Mapped as Sender>::Values>,
        PhantomData::<Cons<String, Cons<String, Nil>>>,
    );
    assert_same_type(
        PhantomData::<<Mapped as Sender>::Errors>,
        PhantomData::<WithCaptured<Cons<IoFault, Nil>>>,
    );
    assert_eq!(<<Mapped as Sender>::Values as TypeList>::LEN, 2);

    let values: TypeNames = <<Mapped as Sender>::Values as TypeList>::describe();
    assert_eq!(values.len(), 1);
    assert!(values.contains_type::<String>());

    let errors = <<Mapped as Sender>::Errors as ErrorKinds>::describe();
    assert_eq!(
        errors.as_slice(),
        &[
            std::any::type_name::<IoFault>(),
            std::any::type_name::<CapturedError>()
        ]
    );
}

/// Implements `Invoke` by value only.
struct Tally(u32);

impl Invoke<i32> for Tally {
    type Output = String;

    fn invoke(self, n: i32) -> Result<String, CapturedError> {
        Ok(format!("{}:{n}", self.0))
    }
}

impl Invoke<(String, u8)> for Tally {
    type Output = String;

    fn invoke(self, (name, b): (String, u8)) -> Result<String, CapturedError> {
        Ok(format!("{}:{name}{b}", self.0))
    }
}

#[test]
fn by_value_function_type_supports_consuming_bind() {
    let (probe, log) = Probe::<String, Failure>::new();
    let mut op = connect(TwoShapes::Pair(2).transform(Tally(1)), probe);
    op.start();
    assert_eq!(log.single(), Fired::Value("1:pair2".to_string()));
}

#[test]
fn shared_bind_reuses_sender_and_function() {
    let sender = TwoShapes::Number(1).transform(Render);
    for _ in 0..3 {
        let (probe, log) = Probe::<String, Failure>::new();
        let mut op = connect(&sender, probe);
        op.start();
        assert_eq!(log.single(), Fired::Value("n=1".to_string()));
    }
}

#[test]
fn chain_across_threads_is_observed_by_sync_wait() {
    init_test_logging();
    test_phase!("chain_across_threads_is_observed_by_sync_wait");
    let caller = std::thread::current().id();
    let chain = on_new_thread(move || std::thread::current().id())
        .transform(move |worker: std::thread::ThreadId| worker != caller)
        .transform(|moved: bool| if moved { "worker" } else { "caller" });
    let outcome: Outcome<&str, CapturedError> = sync_wait(chain).unwrap();
    assert_eq!(outcome.unwrap(), "worker");
    test_complete!("chain_across_threads_is_observed_by_sync_wait");
}

#[test]
fn panic_inside_chain_becomes_error_outcome() {
    init_test_logging();
    let chain = just(2)
        .transform(|x: i32| x * 10)
        .transform(|x: i32| -> i32 {
            assert!(x < 10, "value {x} too large");
            x
        })
        .transform(|_: i32| -> i32 { unreachable!("must not run after a failure") });
    let outcome: Outcome<i32, CapturedError> = quiet_panics(|| sync_wait(chain)).unwrap();
    let err = outcome.unwrap_err();
    assert!(err.is_panic());
    assert_eq!(err.panic_payload().unwrap().message(), "value 20 too large");
}

#[test]
fn domain_error_and_done_skip_every_stage() {
    let chain = just_error(IoFault(1))
        .transform(|_: i32| -> i32 { unreachable!() })
        .transform(|_: i32| -> i32 { unreachable!() });
    let outcome: Outcome<i32, Failure> = sync_wait(chain).unwrap();
    assert_eq!(outcome, Outcome::Err(Failure::Io(IoFault(1))));

    let chain = just_done().transform(|_: i32| -> i32 { unreachable!() });
    let outcome: Outcome<i32, Failure> = sync_wait(chain).unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
}

/// Drops its receiver when started, violating exactly-once.
struct Careless;

struct CarelessOperation<R>(Option<R>);

impl Sender for Careless {
    type Values = Cons<i32, Nil>;
    type Errors = DomainErrors<Nil>;
}

impl<R: ValueReceiver<i32>> Connect<R> for Careless {
    type Operation = CarelessOperation<R>;

    fn connect(self, receiver: R) -> Self::Operation {
        CarelessOperation(Some(receiver))
    }
}

impl<R: Receiver> OperationState for CarelessOperation<R> {
    fn start(&mut self) {
        self.0 = None;
    }
}

#[test]
fn dropped_receiver_through_chain_is_abandoned() {
    init_test_logging();
    let chain = Careless.transform(|x: i32| x + 1);
    let err = sync_wait::<_, i32, CapturedError>(chain).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Abandoned);
    assert!(err.kind().is_protocol_violation());
}

#[test]
fn stop_request_reaches_the_predecessor() {
    let source = StopSource::new();
    source.request_stop();
    let config = WaitConfig::default()
        .with_stop_token(source.token())
        .with_timeout(Duration::from_secs(5));
    let chain = on_new_thread(|| -> i32 { unreachable!("stopped before running") })
        .transform(|x: i32| x);
    let outcome: Outcome<i32, CapturedError> = sync_wait_with(chain, &config).unwrap();
    assert!(outcome.is_cancelled());

    let (probe, log) = Probe::<i32, Failure>::new();
    let mut op = connect(
        just(1).transform(|x: i32| x),
        probe.with_stop_token(source.token()),
    );
    op.start();
    assert_eq!(log.single(), Fired::Done);
}

struct Allowance;

impl Query for Allowance {
    type Output = u32;
}

impl<V, E> Queryable<Allowance> for Probe<V, E> {
    fn query(&self, _query: &Allowance) -> u32 {
        11
    }
}

/// Completes with the answer to [`Allowance`] from its receiver.
struct AskAllowance;

struct AskAllowanceOperation<R>(Option<R>);

impl Sender for AskAllowance {
    type Values = Cons<u32, Nil>;
    type Errors = DomainErrors<Nil>;
}

impl<R: ValueReceiver<u32> + Queryable<Allowance>> Connect<R> for AskAllowance {
    type Operation = AskAllowanceOperation<R>;

    fn connect(self, receiver: R) -> Self::Operation {
        AskAllowanceOperation(Some(receiver))
    }
}

impl<R: ValueReceiver<u32> + Queryable<Allowance>> OperationState for AskAllowanceOperation<R> {
    fn start(&mut self) {
        if let Some(receiver) = self.0.take() {
            let answer = receiver.query(&Allowance);
            receiver.set_value(answer);
        }
    }
}

#[test]
fn custom_queries_pass_through_adapters() {
    let (probe, log) = Probe::<u32, Failure>::new();
    let chain = AskAllowance.transform(|n: u32| n * 2).transform(|n: u32| n + 1);
    let mut op = connect(chain, probe);
    op.start();
    assert_eq!(log.single(), Fired::Value(23));
}

#[test]
fn trace_reaches_downstream_receiver() {
    let (probe, _log) = Probe::<i32, Failure>::new();
    let inner = TransformReceiver::new(|x: i32| x, probe);
    let outer = TransformReceiver::new(|x: i32| x + 1, inner);
    let entries = async_trace(&outer);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].depth, 0);
    assert!(entries[0].type_name.contains("Probe"));
    assert!(entries[0].to_string().contains("Probe"));
}

#[test]
fn sync_wait_converts_into_wider_types() {
    let outcome: Outcome<i64, Failure> = sync_wait(just(7_i32).transform(|x: i32| x * 6)).unwrap();
    assert_eq!(outcome, Outcome::Ok(42_i64));
}
