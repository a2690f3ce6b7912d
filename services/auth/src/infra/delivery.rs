use portal_domain::channel::Destination;
use portal_domain::verification::VerificationPurpose;

use crate::domain::delivery::{CodeSender, DeliveryError, EmailSender, SmsSender};
use crate::domain::message::{render_email, render_sms};

/// Routes a code to the sender owning the destination's channel.
#[derive(Clone)]
pub struct ChannelRouter<E, S> {
    pub email: E,
    pub sms: S,
    pub app_name: String,
}

impl<E: EmailSender, S: SmsSender> CodeSender for ChannelRouter<E, S> {
    async fn send_code(
        &self,
        destination: &Destination,
        purpose: VerificationPurpose,
        code: &str,
    ) -> Result<(), DeliveryError> {
        match destination {
            Destination::Email { address } => {
                let message = render_email(&self.app_name, address, purpose, code);
                self.email.send(&message).await
            }
            Destination::Sms { phone } => {
                let message = render_sms(&self.app_name, phone, purpose, code);
                self.sms.send(&message).await
            }
        }
    }
}
