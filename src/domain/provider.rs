use crate::domain::error::ProviderError;
use crate::domain::models::Region;

/// Platform beacon-scanning service.
///
/// Implementations report region transitions and ranging results as
/// [`BeaconEvent`](crate::domain::models::BeaconEvent)s on the channel they
/// were created with; the methods here only subscribe and unsubscribe.
pub trait BeaconProvider {
    fn start_monitoring(&mut self, region: &Region) -> Result<(), ProviderError>;
    fn stop_monitoring(&mut self, region: &Region) -> Result<(), ProviderError>;
    fn start_ranging(&mut self, region: &Region) -> Result<(), ProviderError>;
    fn stop_ranging(&mut self, region: &Region) -> Result<(), ProviderError>;

    /// Release the scanning service. No further events are delivered.
    fn unbind(&mut self) -> Result<(), ProviderError>;
}

impl<P: BeaconProvider + ?Sized> BeaconProvider for Box<P> {
    fn start_monitoring(&mut self, region: &Region) -> Result<(), ProviderError> {
        (**self).start_monitoring(region)
    }

    fn stop_monitoring(&mut self, region: &Region) -> Result<(), ProviderError> {
        (**self).stop_monitoring(region)
    }

    fn start_ranging(&mut self, region: &Region) -> Result<(), ProviderError> {
        (**self).start_ranging(region)
    }

    fn stop_ranging(&mut self, region: &Region) -> Result<(), ProviderError> {
        (**self).stop_ranging(region)
    }

    fn unbind(&mut self) -> Result<(), ProviderError> {
        (**self).unbind()
    }
}
