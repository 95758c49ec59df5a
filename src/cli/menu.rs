use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ordinals_psbt::{
    OrdinalTransferRequest, PaymentRequest, PsbtEngine, PsbtResult, UtxoSource,
};

use super::prompt::{read_amount, read_line, read_ordinal_transfer, read_payment};

pub async fn run_interactive_mode<S: UtxoSource>(
    engine: &PsbtEngine<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        println!("\n=== Ordinals PSBT Menu ===");
        println!("1. Build a payment PSBT");
        println!("2. Build an inscription transfer PSBT");
        println!("3. Broadcast a signed PSBT");
        println!("4. Exit");

        match read_line("Enter your choice (1-4): ")?.as_str() {
            "1" => {
                let recipient = read_line("Recipient address: ")?;
                let amount = read_amount("Amount to send (in satoshis): ")?;
                let payment = read_payment(amount)?;
                let fee_rate = read_amount("Fee rate (sat/vB): ")?;

                match engine.generate_psbt(&payment, None, &recipient, fee_rate).await {
                    Ok(result) => print_result(&result, &payment, None),
                    Err(e) => println!("Failed to build PSBT: {}", e),
                }
            }
            "2" => {
                let recipient = read_line("Recipient address: ")?;
                let ordinals = read_ordinal_transfer()?;
                let payment = read_payment(0)?;
                let fee_rate = read_amount("Fee rate (sat/vB): ")?;

                match engine
                    .generate_psbt(&payment, Some(&ordinals), &recipient, fee_rate)
                    .await
                {
                    Ok(result) => print_result(&result, &payment, Some(&ordinals)),
                    Err(e) => println!("Failed to build PSBT: {}", e),
                }
            }
            "3" => {
                let text = read_line("Signed PSBT (base64): ")?;
                let bytes = match BASE64.decode(text.as_bytes()) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        println!("Invalid base64: {}", e);
                        continue;
                    }
                };
                match engine.push_psbt(&bytes).await {
                    Ok(txid) => println!("Transaction sent successfully! TXID: {}", txid),
                    Err(e) => println!("Failed to send transaction: {}", e),
                }
            }
            "4" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }

    Ok(())
}

fn print_result(
    result: &PsbtResult,
    payment: &PaymentRequest,
    ordinals: Option<&OrdinalTransferRequest>,
) {
    println!("\nPSBT built.");
    println!("  - payment inputs: {}", result.payment_utxo_count);
    println!("  - inscription input: {}", result.ordinal_input);
    println!("  - fee: {} satoshis", result.fee);
    println!("\n{}", result.psbt_base64);

    let inputs = result.inputs_to_sign(payment, ordinals);
    match serde_json::to_string_pretty(&inputs) {
        Ok(json) => println!("\nInputs to sign:\n{}", json),
        Err(e) => println!("Failed to render inputs to sign: {}", e),
    }
}
