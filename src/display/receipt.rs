//! Receipt display formatting
//!
//! Formats an account receipt for terminal output.

use crate::models::Receipt;

const RULE: &str = "-------------------";

/// Format a receipt: holder, number, balance and recent history
pub fn format_receipt(receipt: &Receipt) -> String {
    let mut output = String::new();

    output.push_str("\nTransaction Receipt\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!("Account Holder: {}\n", receipt.holder_name));
    output.push_str(&format!("Account Number: {}\n", receipt.account_number));
    output.push_str(&format!("Balance: {:.2}\n", receipt.balance));
    output.push_str("Recent Transactions:\n");

    if receipt.recent.is_empty() && receipt.skipped == 0 {
        output.push_str("  (none)\n");
    }
    for record in &receipt.recent {
        output.push_str(&format!("- {}\n", record));
    }
    if receipt.skipped > 0 {
        output.push_str(&format!(
            "  ({} transaction{} could not be decrypted)\n",
            receipt.skipped,
            if receipt.skipped == 1 { "" } else { "s" }
        ));
    }

    output.push_str(RULE);
    output.push('\n');
    output
}
