use crate::text_enum::text_enum;

text_enum! {
    /// How an expense was paid or a revenue was received.
    pub enum PaymentMethod: "payment method" {
        Cash => "dinheiro",
        Pix => "pix",
        CreditCard => "cartao_credito",
        DebitCard => "cartao_debito",
        BankTransfer => "transferencia",
        Boleto => "boleto",
    }
}
