use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, trace, warn};
use zerocopy::IntoBytes;

use crate::command::{Command, MarkerPosition};
use crate::dispatch::Dispatcher;
use crate::error::RootError;
use crate::event::Event;
use crate::limiter::{DEFAULT_SENDS_PER_WINDOW, RateLimiter};
use crate::packet::RawFrame;
use crate::sensors::SensorState;
use crate::transport::{
    Peripheral, RX_CHARACTERISTIC, ScanFilter, TX_CHARACTERISTIC, Transport, UART_SERVICE,
};

/// Pause after an instantaneous command so back-to-back sends stay inside
/// the link budget.
const PACING_DELAY: Duration = Duration::from_millis(100);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Session tunables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub sends_per_second: u32,
    pub pacing_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sends_per_second: DEFAULT_SENDS_PER_WINDOW,
            pacing_delay: PACING_DELAY,
        }
    }
}

/// A driver session for one robot.
///
/// Owns the transport handle and all mutable session state. Command
/// methods take `&mut self`; the only other writer is the pump task, which
/// touches nothing but the sensor snapshot and the dispatcher.
///
/// Send-path contract: while disconnected, every command resolves `Ok`
/// without touching the transport; a frame refused by the rate limiter is
/// silently dropped. Neither is surfaced as an error.
pub struct Root<T: Transport> {
    transport: T,
    config: SessionConfig,
    limiter: RateLimiter,
    state: Arc<Mutex<SensorState>>,
    dispatcher: Dispatcher,
    events: broadcast::Sender<Event>,
    pump: Option<JoinHandle<()>>,
}

impl<T: Transport> Root<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            limiter: RateLimiter::new(config.sends_per_second),
            transport,
            config,
            state: Arc::new(Mutex::new(SensorState::default())),
            dispatcher: Dispatcher::new(),
            events,
            pump: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Discover robots advertising the identifier service.
    pub async fn scan(&mut self) -> Result<Vec<Peripheral>, RootError> {
        info!("scanning for robots");
        self.transport.scan(&ScanFilter::for_robot()).await
    }

    /// Attach to a discovered candidate and start routing its
    /// notifications into the sensor snapshot and the dispatcher.
    pub async fn connect(&mut self, id: &str) -> Result<(), RootError> {
        if let Some(stale) = self.pump.take() {
            stale.abort();
        }
        self.transport.connect(id).await?;
        let notifications = self
            .transport
            .start_notifications(UART_SERVICE, TX_CHARACTERISTIC)
            .await?;
        self.pump = Some(spawn_pump(
            notifications,
            Arc::clone(&self.state),
            self.dispatcher.clone(),
            self.events.clone(),
        ));
        info!(id, "connected");
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<(), RootError> {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.transport.disconnect().await?;
        info!("disconnected");
        Ok(())
    }

    /// Clone of the current sensor snapshot.
    pub fn sensors(&self) -> SensorState {
        self.state.lock().unwrap().clone()
    }

    /// Every decoded inbound event. Hosts watch this for
    /// [`Event::NosePress`] and run their own stop-all.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Drive `cm` centimeters (negative is backward) and wait for the
    /// motor-finished notification.
    pub async fn drive_distance(&mut self, cm: f64) -> Result<(), RootError> {
        self.run_to_completion(Command::DriveDistance { cm }).await
    }

    /// Rotate `degrees` in place (positive is clockwise) and wait for the
    /// motor-finished notification.
    pub async fn rotate_angle(&mut self, degrees: f64) -> Result<(), RootError> {
        self.run_to_completion(Command::RotateAngle { degrees }).await
    }

    /// Move the marker and wait for the actuator to report it in place.
    pub async fn set_marker(&mut self, position: MarkerPosition) -> Result<(), RootError> {
        self.run_to_completion(Command::SetMarker(position)).await
    }

    /// Play a tone and wait for it to finish. Frequency saturates to
    /// 20..=10000 Hz, duration to 65535 ms.
    pub async fn play_tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<(), RootError> {
        self.run_to_completion(Command::PlayTone {
            frequency_hz,
            duration,
        })
        .await
    }

    /// Speak a phrase (UTF-8, truncated to the 16-byte payload window) and
    /// wait for playback to finish.
    pub async fn say_phrase(&mut self, text: &str) -> Result<(), RootError> {
        self.run_to_completion(Command::SayPhrase(text.to_string())).await
    }

    /// Set both wheel speeds in cm/s; saturates to the robot's range.
    pub async fn set_wheel_speeds(&mut self, left_cm_s: f64, right_cm_s: f64) -> Result<(), RootError> {
        self.run_paced(Command::SetWheelSpeeds { left_cm_s, right_cm_s }).await
    }

    /// Light the LED ring. Channels are 0..=100 percentages, saturating.
    pub async fn set_lights(&mut self, red: u8, green: u8, blue: u8) -> Result<(), RootError> {
        self.run_paced(Command::SetLights { red, green, blue }).await
    }

    /// Immediate stop-and-reset, fire and forget: no completion is awaited
    /// and the limiter is bypassed so the safety command is never the one
    /// that gets dropped.
    pub async fn stop_all(&mut self) -> Result<(), RootError> {
        if !self.is_connected() {
            return Ok(());
        }
        self.send(Command::StopAll.to_frame(), false).await
    }

    /// Correlate one long-running command with its completion signal.
    ///
    /// The single-fire subscription is registered before the write so a
    /// completion arriving between the two cannot be missed. Exactly one
    /// of signal/deadline settles the outcome; the losing future is
    /// dropped and its dispatcher slot removed.
    async fn run_to_completion(&mut self, command: Command) -> Result<(), RootError> {
        if !self.is_connected() {
            trace!(command = %command.kind(), "not connected, command is a no-op");
            return Ok(());
        }
        let (signal, deadline) = match (command.completion_signal(), command.timeout()) {
            (Some(signal), Some(deadline)) => (signal, deadline),
            _ => return self.send(command.to_frame(), true).await,
        };
        let mut completion = self.dispatcher.subscribe(signal);
        self.send(command.to_frame(), true).await?;
        match timeout(deadline, completion.wait()).await {
            Ok(()) => {
                debug!(command = %command.kind(), signal = %signal, "completed");
                Ok(())
            }
            Err(_) => Err(RootError::Timeout {
                command: command.kind(),
                timeout: deadline,
            }),
        }
    }

    /// Send an instantaneous command, then pause long enough that a
    /// block-style host looping on these cannot outrun the link.
    async fn run_paced(&mut self, command: Command) -> Result<(), RootError> {
        if !self.is_connected() {
            trace!(command = %command.kind(), "not connected, command is a no-op");
            return Ok(());
        }
        self.send(command.to_frame(), true).await?;
        sleep(self.config.pacing_delay).await;
        Ok(())
    }

    /// Top-level send path. Disconnected and rate-limited sends resolve
    /// as silent no-ops; only transport failures surface. Pass
    /// `use_limiter = false` only for frames that must never be dropped.
    pub async fn send(&mut self, frame: RawFrame, use_limiter: bool) -> Result<(), RootError> {
        if !self.is_connected() {
            return Ok(());
        }
        if use_limiter && !self.limiter.try_acquire() {
            debug!(bytes = hex::encode(frame.as_bytes()), "rate limited, dropping frame");
            return Ok(());
        }
        debug!(bytes = hex::encode(frame.as_bytes()), "write");
        self.transport
            .write(UART_SERVICE, RX_CHARACTERISTIC, frame.as_bytes())
            .await
    }
}

impl<T: Transport> Drop for Root<T> {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

/// Inbound pump: decode each notification, fold it into the sensor
/// snapshot, publish its completion signal, and fan it out to the host.
fn spawn_pump(
    mut notifications: mpsc::Receiver<Bytes>,
    state: Arc<Mutex<SensorState>>,
    dispatcher: Dispatcher,
    events: broadcast::Sender<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(bytes) = notifications.recv().await {
            let frame = match RawFrame::parse(&bytes) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(bytes = hex::encode(&bytes), %err, "ignoring undecodable notification");
                    continue;
                }
            };
            trace!(bytes = hex::encode(frame.as_bytes()), "notification");
            let event = Event::from(frame);
            state.lock().unwrap().apply(&event);
            if let Some(signal) = event.signal() {
                dispatcher.publish(signal);
            }
            // no subscribers is fine
            let _ = events.send(event);
        }
        debug!("notification stream closed");
    })
}
