use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    error::SessionError,
    fix::Fix,
    route_planner::RoutePlanner,
    session::{NavigationSession, NavigationUpdate, SessionState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    Completed,
    Stopped,
    /// The fix source closed its channel
    FixesExhausted,
    /// Nobody listens to updates anymore
    UpdatesClosed,
}

/// Feeds fixes from a single-consumer channel into the session, one at a time.
/// Returns as soon as the session is stopped, even while no fix is arriving.
pub async fn drive<P: RoutePlanner>(
    session: &mut NavigationSession<P>,
    mut fixes: mpsc::Receiver<Fix>,
    updates: mpsc::Sender<NavigationUpdate>,
) -> Result<DriveOutcome, SessionError> {
    let mut stop_signal = session.stop_signal();

    loop {
        let fix = tokio::select! {
            biased;
            Ok(_) = stop_signal.wait_for(|stopped| *stopped) => {
                debug!("Session stopped, leaving the fix loop");
                return Ok(DriveOutcome::Stopped);
            }
            fix = fixes.recv() => match fix {
                Some(fix) => fix,
                None => return Ok(DriveOutcome::FixesExhausted),
            },
        };

        let update = match session.on_fix(fix) {
            Ok(update) => update,
            Err(SessionError::NotActive) if session.state() == SessionState::Stopped => {
                return Ok(DriveOutcome::Stopped);
            }
            Err(error) => return Err(error),
        };

        let arrived = update.arrived;

        if updates.send(update).await.is_err() {
            debug!("Update receiver dropped, stopping the fix loop");
            return Ok(DriveOutcome::UpdatesClosed);
        }

        if arrived {
            return Ok(DriveOutcome::Completed);
        }
    }
}
