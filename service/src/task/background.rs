//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Boxed error of a [`Task`] running in the [`Background`].
type BoxedError = Box<dyn Error + 'static>;

/// Background environment for running [`Task`]s on the current thread.
///
/// Resolves once all the spawned [`Task`]s complete, or as soon as any of
/// them fails.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set of tasks.
    set: task::LocalSet,

    /// Handles of spawned tasks.
    handles: Vec<task::JoinHandle<Result<(), BoxedError>>>,
}

impl Background {
    /// Spawns a new [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.handles.push(
            self.set
                .spawn_local(future.map_err(|e| BoxedError::from(Box::new(e)))),
        );
    }

    /// Indicates whether no [`Task`] was spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), BoxedError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        let tasks = handles.into_iter().map(|h| {
            h.map(|joined| match joined {
                Ok(res) => res,
                Err(e) => Err(BoxedError::from(Box::new(e))),
            })
            .boxed_local()
        });
        future::try_join_all(iter::once(set.map(Ok).boxed_local()).chain(tasks))
            .map_ok(drop)
            .boxed_local()
    }
}

#[cfg(test)]
mod spec {
    use std::{fmt, future::IntoFuture as _};

    use super::Background;

    #[derive(Debug)]
    struct Failure;

    impl fmt::Display for Failure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("failure")
        }
    }

    impl std::error::Error for Failure {}

    #[tokio::test]
    async fn completes_with_tasks() {
        let mut bg = Background::default();
        assert!(bg.is_empty());
        bg.spawn(async { Ok::<_, Failure>(()) });
        assert!(!bg.is_empty());

        assert!(bg.into_future().await.is_ok());
    }

    #[tokio::test]
    async fn fails_with_any_task() {
        let mut bg = Background::default();
        bg.spawn(async { Ok::<_, Failure>(()) });
        bg.spawn(async { Err::<(), _>(Failure) });

        let err = bg.into_future().await.unwrap_err();
        assert_eq!(err.to_string(), "failure");
    }
}
