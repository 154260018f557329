#![allow(dead_code)]

use salary_tax_analyst::PayslipComponents;
use serde_json::{json, Value};

pub const SAMPLE_PAYSLIP: &str = "\
ACME Corp - Payslip for April 2024
Basic Salary          50,000.00
House Rent Allowance  20,000.00
Special Allowance     15,500.00
Provident Fund (PF)    1,800.00
Professional Tax         200.00
Net Pay               83,500.00
";

pub fn sample_components() -> PayslipComponents {
    PayslipComponents {
        basic_salary: Some(50000.0),
        house_rent_allowance: Some(20000.0),
        employee_pf_contribution: Some(1800.0),
        professional_tax: Some(200.0),
        special_allowance: Some(15500.0),
        ..Default::default()
    }
}

pub const SAMPLE_REPORT: &str = "\
Based on the data you confirmed, here is your personalized tax opportunity report.

### Section 1: Missed Opportunities

- **80C:** Your PF contribution is Rs. 21,600 per year. You can invest Rs. 128,400 more.
- **80D:** No health insurance premium was found.

### Section 2: Optimization Tips

- Consider a tax-saving FD or ELSS fund.
  - ELSS has a 3 year lock-in.
";

/// A chat completion whose first message calls `name` with `arguments`.
pub fn tool_call_response(name: &str, arguments: &Value) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": name,
                        "arguments": arguments.to_string()
                    }
                }]
            },
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
    })
}

/// A plain chat completion with text content.
pub fn content_response(content: &str) -> Value {
    json!({
        "id": "chatcmpl-2",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[cfg(feature = "openai")]
pub async fn agent_for(server: &wiremock::MockServer) -> salary_tax_analyst::SalaryAgent {
    use salary_tax_analyst::{AgentConfig, SalaryAgent};
    use std::time::Duration;

    let config = AgentConfig::new("test-key")
        .with_base_url(format!("{}/v1/", server.uri()))
        .with_timeout(Duration::from_secs(5));
    SalaryAgent::new(config).expect("agent should build")
}
