use std::io::{self, Write};

use ordinals_psbt::{AddressType, OrdinalTransferRequest, PaymentRequest};

pub fn read_line(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Re-prompts until the input parses as a positive number.
pub fn read_amount(label: &str) -> io::Result<u64> {
    loop {
        let text = read_line(label)?;
        match text.parse::<u64>() {
            Ok(value) if value > 0 => return Ok(value),
            _ => println!("Invalid number: '{}'. Please try again.", text),
        }
    }
}

pub fn read_address_type(label: &str) -> io::Result<AddressType> {
    loop {
        let text = read_line(label)?;
        match text.parse::<AddressType>() {
            Ok(address_type) => return Ok(address_type),
            Err(e) => println!("{}. Use p2pkh, p2sh, p2sh_p2wpkh, p2wpkh or p2tr.", e),
        }
    }
}

fn read_public_key(label: &str) -> io::Result<String> {
    let public_key = read_line(label)?;
    if !matches!(public_key.len(), 64 | 66) {
        println!("Warning: expected a 32 or 33 byte hex public key. Are you sure this is correct?");
    }
    Ok(public_key)
}

pub fn read_payment(amount: u64) -> io::Result<PaymentRequest> {
    println!("\n=== Payer ===");
    let address_type = read_address_type("Payment address type: ")?;
    let address = read_line("Payment address: ")?;
    let public_key = read_public_key("Payment public key (hex): ")?;
    Ok(PaymentRequest {
        address_type,
        address,
        public_key,
        amount,
    })
}

pub fn read_ordinal_transfer() -> io::Result<OrdinalTransferRequest> {
    println!("\n=== Inscription holder ===");
    let address_type = read_address_type("Ordinals address type: ")?;
    let address = read_line("Ordinals address: ")?;
    let public_key = read_public_key("Ordinals public key (hex): ")?;
    let inscription_id = read_line("Inscription id: ")?;
    Ok(OrdinalTransferRequest {
        address_type,
        address,
        public_key,
        inscription_id,
    })
}
