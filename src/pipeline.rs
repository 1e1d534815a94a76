// Orchestrator: encode the images in parallel, then build, send, decode and
// render a single verification request.

use crate::api::{build_request, decode_response, Transport, VerificationRequest, VerificationResult};
use crate::config::Config;
use crate::error::{EncodeError, ImageRole, VerifyError};
use crate::image::{encode_file, EncodedImage};
use crate::ui;
use std::io::Write;
use std::thread;
use std::time::Instant;

type Slot = thread::Result<Result<EncodedImage, EncodeError>>;

/// Run one verification transaction and write the rendered result to `out`.
///
/// If any image fails to encode nothing is sent. When several fail at once
/// the reported one is picked in the order photo, image1, image2.
pub fn run<T: Transport>(config: &Config, transport: &T, out: &mut impl Write) -> Result<VerificationResult, VerifyError> {
    let started = Instant::now();

    let payload = encode_images(config)?;
    let request = build_request(config, &payload)?;
    drop(payload);

    let spinner = ui::spinner("Verifying...");
    let outcome = transport.execute(request);
    spinner.finish_and_clear();

    let result = decode_response(&outcome?)?;
    log::info!("job {} finished in state {:?}", result.job_id, result.state);
    for (i, sample) in result.samples.iter().enumerate() {
        log::debug!("sample {} eye centers: {:?}", i + 1, sample.eye_centers);
    }

    ui::render_result(out, &result, started.elapsed())?;
    Ok(result)
}

/// Encode photo, image1 and (optionally) image2 on their own threads. Every
/// thread is joined before any result is looked at.
pub fn encode_images(config: &Config) -> Result<VerificationRequest, VerifyError> {
    let (photo, image1, image2) = thread::scope(|s| {
        let photo = s.spawn(|| encode_file(&config.photo));
        let image1 = s.spawn(|| encode_file(&config.image1));
        let image2 = config.image2.as_deref().map(|p| s.spawn(move || encode_file(p)));

        let photo: Slot = photo.join();
        let image1: Slot = image1.join();
        let image2: Option<Slot> = image2.map(|h| h.join());
        (photo, image1, image2)
    });

    let idphoto = take(photo, ImageRole::Photo)?;
    let liveimage1 = take(image1, ImageRole::Image1)?;
    let liveimage2 = image2.map(|slot| take(slot, ImageRole::Image2)).transpose()?;

    Ok(VerificationRequest {
        idphoto,
        liveimage1,
        liveimage2,
    })
}

fn take(slot: Slot, role: ImageRole) -> Result<EncodedImage, VerifyError> {
    match slot {
        Ok(Ok(image)) => {
            log::debug!("{} encoded as {} ({} base64 chars)", role, image.mime().as_str(), image.payload().len());
            Ok(image)
        }
        Ok(Err(source)) => Err(VerifyError::Encode { role, source }),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
