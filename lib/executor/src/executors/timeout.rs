use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::{
    executors::{
        common::{SubschemaExecutionRequest, SubschemaExecutor, SubschemaExecutorBoxedArc},
        error::SubschemaExecutorError,
    },
    response::subschema_response::SubschemaResponse,
};

pub struct TimeoutExecutor {
    pub subschema_name: String,
    pub timeout: Duration,
    pub executor: SubschemaExecutorBoxedArc,
}

impl TimeoutExecutor {
    pub fn new(
        subschema_name: impl Into<String>,
        timeout: Duration,
        executor: SubschemaExecutorBoxedArc,
    ) -> Self {
        Self {
            subschema_name: subschema_name.into(),
            timeout,
            executor,
        }
    }
}

#[async_trait]
impl SubschemaExecutor for TimeoutExecutor {
    async fn execute(
        &self,
        execution_request: SubschemaExecutionRequest,
    ) -> Result<SubschemaResponse, SubschemaExecutorError> {
        let execution = self.executor.execute(execution_request);
        match tokio::time::timeout(self.timeout, execution).await {
            Ok(response) => response,
            Err(_) => {
                warn!(
                    subschema = %self.subschema_name,
                    timeout = ?self.timeout,
                    "sub-query timed out"
                );
                Err(SubschemaExecutorError::RequestTimeout(
                    self.subschema_name.clone(),
                    self.timeout,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::{
        executors::{
            common::{SubschemaExecutionRequest, SubschemaExecutor},
            error::SubschemaExecutorError,
            timeout::TimeoutExecutor,
        },
        response::subschema_response::SubschemaResponse,
    };

    struct MockExecutor {
        delay: Duration,
    }

    #[async_trait]
    impl SubschemaExecutor for MockExecutor {
        async fn execute(
            &self,
            _execution_request: SubschemaExecutionRequest,
        ) -> Result<SubschemaResponse, SubschemaExecutorError> {
            tokio::time::sleep(self.delay).await;
            Ok(SubschemaResponse::default())
        }
    }

    #[tokio::test]
    async fn expired_calls_become_timeout_errors() {
        let executor = TimeoutExecutor::new(
            "model",
            Duration::from_millis(10),
            MockExecutor {
                delay: Duration::from_millis(500),
            }
            .to_boxed_arc(),
        );

        let result = executor
            .execute(SubschemaExecutionRequest::new("{ __typename }"))
            .await;

        assert_eq!(
            result,
            Err(SubschemaExecutorError::RequestTimeout(
                "model".to_string(),
                Duration::from_millis(10)
            ))
        );
        insta::assert_snapshot!(result.unwrap_err(), @r#"Request to subschema "model" timed out after 10ms"#);
    }

    #[tokio::test]
    async fn fast_calls_pass_through() {
        let executor = TimeoutExecutor::new(
            "model",
            Duration::from_secs(1),
            MockExecutor {
                delay: Duration::ZERO,
            }
            .to_boxed_arc(),
        );

        let result = executor
            .execute(SubschemaExecutionRequest::new("{ __typename }"))
            .await;

        assert_eq!(result, Ok(SubschemaResponse::default()));
    }
}
