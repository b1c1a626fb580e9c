//! # Example: loopback
//!
//! Runs a [`Dispatcher`] against an in-memory "broker" that echoes every
//! published message back as an inbound message, and resets the link every
//! fourth send. The inbound handler is a tiny assistant whose interaction mode
//! lives in an owned context object, passed by `&mut` to each action.
//!
//! ## Flow
//! ```text
//! send(Publish) ─► queue ─► LoopbackConn::send ─┬─► Assistant::on_message ─► reply logged
//!                                               └─► every 4th send: link reset
//!                                                     ─► carried, reconnect, resend
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example loopback
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use linkvisor::{
    ClientInfo, Connection, Connector, DeathSignal, DispatchError, Dispatcher, Handler, HandlerRef,
};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Outbound and inbound message of the loopback broker.
#[derive(Clone, Debug)]
struct Publish {
    topic: String,
    payload: String,
}

impl Publish {
    fn new(topic: &str, payload: &str) -> Self {
        Self {
            topic: topic.to_string(),
            payload: payload.to_string(),
        }
    }
}

struct LoopbackConnector {
    sends: Arc<AtomicUsize>,
}

struct LoopbackConn {
    handler: HandlerRef<Publish>,
    sends: Arc<AtomicUsize>,
    signal: DeathSignal,
}

#[async_trait]
impl Connector for LoopbackConnector {
    type Inbound = Publish;
    type Conn = LoopbackConn;

    async fn connect(
        &self,
        info: &ClientInfo,
        handler: HandlerRef<Publish>,
    ) -> Result<LoopbackConn, DispatchError> {
        info!(address = %info.address, subscriptions = info.subscriptions.len(), "loopback connected");
        Ok(LoopbackConn {
            handler,
            sends: Arc::clone(&self.sends),
            signal: DeathSignal::new(),
        })
    }
}

#[async_trait]
impl Connection for LoopbackConn {
    type Message = Publish;

    async fn send(&mut self, msg: &Publish) -> Result<(), DispatchError> {
        if self.sends.fetch_add(1, Ordering::SeqCst) % 4 == 3 {
            self.signal.fire();
            return Err(DispatchError::send("link reset by peer"));
        }
        if let Err(e) = self.handler.on_message(msg.clone()).await {
            self.handler.on_error(&e);
        }
        Ok(())
    }

    fn dying(&self) -> DeathSignal {
        self.signal.clone()
    }

    async fn close(&mut self) -> Result<(), DispatchError> {
        info!("loopback closed");
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Interactive,
    Analytical,
}

/// Everything the assistant's actions may read or change.
struct AssistantCtx {
    mode: Mode,
}

fn switch_mode(ctx: &mut AssistantCtx, requested: &str) -> Result<String, DispatchError> {
    let target = match requested {
        "analytical" | "debug" => Mode::Analytical,
        "interactive" => Mode::Interactive,
        other => {
            return Err(DispatchError::Handler {
                error: format!("unknown mode {other:?}"),
            });
        }
    };
    if ctx.mode == target {
        return Ok(format!("already in {target:?} mode"));
    }
    ctx.mode = target;
    Ok(format!("switched to {target:?} mode"))
}

fn run_action(ctx: &mut AssistantCtx, intent: &str, entity: &str) -> Result<String, DispatchError> {
    match intent {
        "greet" => Ok("hello, how can I help?".to_string()),
        "thanks" => Ok("any time".to_string()),
        "goodbye" => Ok("see you".to_string()),
        "switch_mode" => switch_mode(ctx, entity),
        other => Err(DispatchError::Handler {
            error: format!("no action for intent {other:?}"),
        }),
    }
}

struct Assistant {
    ctx: Mutex<AssistantCtx>,
}

#[async_trait]
impl Handler<Publish> for Assistant {
    async fn on_message(&self, msg: Publish) -> Result<(), DispatchError> {
        let intent = msg.topic.trim_start_matches("nlu/");
        let mut ctx = self.ctx.lock().await;
        let reply = run_action(&mut ctx, intent, &msg.payload)?;
        if ctx.mode == Mode::Analytical {
            info!(intent, entity = %msg.payload, %reply, "assistant");
        } else {
            info!(%reply, "assistant");
        }
        Ok(())
    }

    fn on_error(&self, err: &DispatchError) {
        tracing::warn!(error = %err, "assistant rejected message");
    }

    fn name(&self) -> &str {
        "assistant"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let info = ClientInfo {
        buffer_size: 4,
        min_interval: Duration::from_millis(100),
        interval: Duration::from_secs(2),
        ..ClientInfo::default()
    }
    .with_client_id("loopback-demo")
    .with_address("mem://loopback");

    let dispatcher = Dispatcher::new(
        info,
        LoopbackConnector {
            sends: Arc::new(AtomicUsize::new(0)),
        },
    );
    let assistant: HandlerRef<Publish> = Arc::new(Assistant {
        ctx: Mutex::new(AssistantCtx {
            mode: Mode::Interactive,
        }),
    });
    dispatcher.start(assistant)?;

    let script = [
        ("nlu/greet", ""),
        ("nlu/switch_mode", "analytical"),
        ("nlu/switch_mode", "debug"),
        ("nlu/thanks", ""),
        ("nlu/switch_mode", "interactive"),
        ("nlu/order_pizza", ""),
        ("nlu/goodbye", ""),
    ];
    for (topic, payload) in script {
        dispatcher.send(Publish::new(topic, payload)).await?;
    }

    tokio::time::sleep(Duration::from_secs(1)).await;
    dispatcher.close().await?;
    Ok(())
}
