//! JavaScript execution and remote-object lifetime.

use serde_json::{Value, json};

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{RemoteObject, ReturnMode};

use super::core::PageSession;

impl PageSession {
    /// Evaluate an expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Evaluate an expression and keep the result page-side in `group`.
    pub async fn evaluate_handle(
        &self,
        expression: &str,
        group: &str,
    ) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": false,
                    "objectGroup": group,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(serde_json::from_value(result["result"].clone())?)
    }

    /// Call `function` with `this` bound to the remote object.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: &[Value],
        mode: ReturnMode<'_>,
    ) -> Result<RemoteObject, CdpError> {
        let mut params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "awaitPromise": true,
        });

        if !args.is_empty() {
            params["arguments"] = json!(args.iter().map(|v| json!({"value": v})).collect::<Vec<_>>());
        }
        match mode {
            ReturnMode::Value => params["returnByValue"] = json!(true),
            ReturnMode::Handle { group } => {
                params["returnByValue"] = json!(false);
                params["objectGroup"] = json!(group);
            }
        }

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        check_exception(&result)?;
        Ok(serde_json::from_value(result["result"].clone())?)
    }

    /// [`call_function_on`](Self::call_function_on) returning the plain value,
    /// `Null` for `null`/`undefined`.
    pub async fn call_function_value(
        &self,
        object_id: &str,
        function: &str,
        args: &[Value],
    ) -> Result<Value, CdpError> {
        let object = self
            .call_function_on(object_id, function, args, ReturnMode::Value)
            .await?;
        Ok(object.value.unwrap_or(Value::Null))
    }

    pub async fn release_object(&self, object_id: &str) -> Result<(), CdpError> {
        self.call("Runtime.releaseObject", Some(json!({"objectId": object_id})))
            .await?;
        Ok(())
    }

    pub async fn release_object_group(&self, group: &str) -> Result<(), CdpError> {
        self.call(
            "Runtime.releaseObjectGroup",
            Some(json!({"objectGroup": group})),
        )
        .await?;
        Ok(())
    }
}

fn check_exception(result: &Value) -> Result<(), CdpError> {
    let Some(exception) = result.get("exceptionDetails") else {
        return Ok(());
    };
    let text = exception["exception"]["description"]
        .as_str()
        .or_else(|| exception["text"].as_str())
        .unwrap_or("Unknown error");
    Err(CdpError::JavaScript(text.to_string()))
}
