use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rusb::{Device, DeviceHandle, GlobalContext};
use std::thread;
use std::time::{Duration, Instant};

use crate::image::{FirmwareImage, ERASED};

/// Teensy 2.0 HalfKay bootloader USB identifiers.
const HALFKAY_VID: u16 = 0x16C0;
const HALFKAY_PID: u16 = 0x0478;

/// ATmega32U4 flash page size in bytes.
pub const PAGE_SIZE: usize = 128;

/// Flash available to the application: 32KB minus the 512 byte bootloader.
pub const USER_FLASH_SIZE: u32 = 32768 - 512;

/// Address that makes HalfKay jump to the application.
const REBOOT_ADDRESS: u32 = 0xFFFF;

/// USB control transfer timeout.
const USB_TIMEOUT: Duration = Duration::from_secs(2);

/// Delay after each page write to allow flash programming.
const PAGE_WRITE_DELAY: Duration = Duration::from_millis(5);

/// Interval between bus scans while waiting for the bootloader.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn find_device() -> Result<Option<Device<GlobalContext>>> {
    let devices = rusb::devices().context("failed to enumerate USB devices")?;
    for device in devices.iter() {
        let desc = device
            .device_descriptor()
            .context("failed to read device descriptor")?;
        if desc.vendor_id() == HALFKAY_VID && desc.product_id() == HALFKAY_PID {
            debug!(
                "HalfKay on bus {} address {}",
                device.bus_number(),
                device.address()
            );
            return Ok(Some(device));
        }
    }
    Ok(None)
}

/// Whether a Teensy in HalfKay bootloader mode is connected.
pub fn detect() -> Result<bool> {
    Ok(find_device()?.is_some())
}

/// HalfKay block for the 32U4: little-endian 16-bit address, then one page.
fn block(address: u32, page: &[u8]) -> Vec<u8> {
    let mut buf = vec![ERASED; 2 + PAGE_SIZE];
    buf[0] = (address & 0xFF) as u8;
    buf[1] = ((address >> 8) & 0xFF) as u8;
    buf[2..2 + page.len()].copy_from_slice(page);
    buf
}

/// An open connection to the HalfKay bootloader.
pub struct HalfKay {
    handle: DeviceHandle<GlobalContext>,
}

impl HalfKay {
    pub fn open() -> Result<Self> {
        let Some(device) = find_device()? else {
            bail!("Teensy bootloader not found. Press the reset button on the Teensy and try again.");
        };
        let handle = device
            .open()
            .context("failed to open Teensy bootloader (may need root/sudo or udev rules)")?;
        Ok(Self { handle })
    }

    /// Poll the bus until the bootloader shows up or `timeout` runs out.
    pub fn wait(timeout: Duration) -> Result<Self> {
        let deadline = Instant::now() + timeout;
        info!("Waiting for Teensy bootloader, press the reset button...");
        while !detect()? {
            if Instant::now() >= deadline {
                bail!("Teensy bootloader not detected within {:?}", timeout);
            }
            thread::sleep(POLL_INTERVAL);
        }
        Self::open()
    }

    /// Program every non-erased page of `image`.
    pub fn program(&self, image: &FirmwareImage) -> Result<()> {
        if image.end_address() > USER_FLASH_SIZE {
            bail!(
                "firmware too large: {} bytes at offset 0x{:04X} exceeds {} byte application flash",
                image.data.len(),
                image.base_address,
                USER_FLASH_SIZE
            );
        }

        let pages = image.pages(PAGE_SIZE);
        let pb = ProgressBar::new(pages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} pages")
                .context("invalid progress bar template")?
                .progress_chars("=> "),
        );
        pb.set_message("Flashing");

        for page in &pages {
            self.write_block(&block(page.address, &page.data))
                .with_context(|| format!("failed to write page at address 0x{:04X}", page.address))?;
            thread::sleep(PAGE_WRITE_DELAY);
            pb.inc(1);
        }

        pb.finish_with_message("Flashed");
        Ok(())
    }

    /// Leave the bootloader and start the application.
    pub fn reboot(self) {
        // The device drops off the bus immediately, so the transfer may fail
        let _ = self.write_block(&block(REBOOT_ADDRESS, &[]));
    }

    fn write_block(&self, buf: &[u8]) -> Result<()> {
        // HID SET_REPORT: bmRequestType 0x21 (host-to-device, class,
        // interface), bRequest 0x09, wValue 0x0200 (output report 0)
        self.handle
            .write_control(0x21, 0x09, 0x0200, 0, buf, USB_TIMEOUT)
            .context("USB control transfer failed")?;
        Ok(())
    }
}
