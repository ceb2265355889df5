// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{error::Error, fmt};

use crate::beat::Strength;

/// A force touch trackpad, driven through the MultitouchSupport actuator API.
pub struct Device {
    device_id: u64,
}

impl Device {
    /// Finds the first multitouch device that supports actuation.
    pub fn find() -> Option<Device> {
        platform::find_device_id().map(|device_id| Device { device_id })
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trackpad ({})", self.device_id)
    }
}

impl super::Actuator for Device {
    fn name(&self) -> String {
        format!("trackpad-{}", self.device_id)
    }

    fn actuate(&self, strength: Strength, intensity: f64) -> Result<(), Box<dyn Error>> {
        platform::actuate(self.device_id, strength.level(), intensity)
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use std::error::Error;

    pub fn find_device_id() -> Option<u64> {
        None
    }

    pub fn actuate(_device_id: u64, _level: u8, _intensity: f64) -> Result<(), Box<dyn Error>> {
        Err("haptic feedback is only supported on macOS".into())
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use std::error::Error;
    use std::ffi::{c_char, c_void};
    use std::ptr;

    type IoReturn = i32;
    type IoObject = u32;
    type CfTypeRef = *const c_void;
    type CfStringRef = *const c_void;
    type CfMutableDictionaryRef = *mut c_void;
    type MtActuatorRef = *mut c_void;

    const IO_OBJECT_NULL: IoObject = 0;
    const KERN_SUCCESS: IoReturn = 0;
    const IO_MAIN_PORT_DEFAULT: u32 = 0;
    const CF_STRING_ENCODING_UTF8: u32 = 0x0800_0100;
    const CF_NUMBER_SINT64_TYPE: i32 = 4;

    #[link(name = "IOKit", kind = "framework")]
    extern "C" {
        fn IOServiceMatching(name: *const c_char) -> CfMutableDictionaryRef;
        fn IOServiceGetMatchingServices(
            main_port: u32,
            matching: CfMutableDictionaryRef,
            existing: *mut IoObject,
        ) -> IoReturn;
        fn IOIteratorNext(iterator: IoObject) -> IoObject;
        fn IORegistryEntryCreateCFProperty(
            entry: IoObject,
            key: CfStringRef,
            allocator: *const c_void,
            options: u32,
        ) -> CfTypeRef;
        fn IOObjectRelease(object: IoObject) -> IoReturn;
    }

    #[link(name = "CoreFoundation", kind = "framework")]
    extern "C" {
        fn CFStringCreateWithCString(
            alloc: *const c_void,
            c_str: *const c_char,
            encoding: u32,
        ) -> CfStringRef;
        fn CFNumberGetValue(number: CfTypeRef, the_type: i32, value_ptr: *mut c_void) -> bool;
        fn CFRelease(cf: CfTypeRef);
        fn CFGetTypeID(cf: CfTypeRef) -> usize;
        fn CFBooleanGetTypeID() -> usize;
        fn CFBooleanGetValue(boolean: CfTypeRef) -> bool;
    }

    #[link(name = "MultitouchSupport", kind = "framework")]
    extern "C" {
        fn MTActuatorCreateFromDeviceID(device_id: u64) -> MtActuatorRef;
        fn MTActuatorOpen(actuator: MtActuatorRef) -> i32;
        fn MTActuatorClose(actuator: MtActuatorRef) -> i32;
        fn MTActuatorActuate(
            actuator: MtActuatorRef,
            actuation_id: i32,
            unknown1: u32,
            unknown2: f32,
            intensity: f32,
        ) -> i32;
    }

    /// Reads a boolean registry property. Anything that isn't a CFBoolean is false.
    unsafe fn bool_property(service: IoObject, key: CfStringRef) -> bool {
        let value = IORegistryEntryCreateCFProperty(service, key, ptr::null(), 0);
        if value.is_null() {
            return false;
        }
        let result = CFGetTypeID(value) == CFBooleanGetTypeID() && CFBooleanGetValue(value);
        CFRelease(value);
        result
    }

    /// Reads a 64 bit integer registry property.
    unsafe fn u64_property(service: IoObject, key: CfStringRef) -> Option<u64> {
        let value = IORegistryEntryCreateCFProperty(service, key, ptr::null(), 0);
        if value.is_null() {
            return None;
        }
        let mut number: i64 = 0;
        let found = CFNumberGetValue(
            value,
            CF_NUMBER_SINT64_TYPE,
            &mut number as *mut i64 as *mut c_void,
        );
        CFRelease(value);
        found.then_some(number as u64)
    }

    pub fn find_device_id() -> Option<u64> {
        unsafe {
            let matching = IOServiceMatching(c"AppleMultitouchDevice".as_ptr());
            if matching.is_null() {
                return None;
            }

            // The matching dictionary is consumed here, even on failure.
            let mut iterator: IoObject = IO_OBJECT_NULL;
            if IOServiceGetMatchingServices(IO_MAIN_PORT_DEFAULT, matching, &mut iterator)
                != KERN_SUCCESS
            {
                return None;
            }

            let device_id_key = CFStringCreateWithCString(
                ptr::null(),
                c"Multitouch ID".as_ptr(),
                CF_STRING_ENCODING_UTF8,
            );
            let actuation_key = CFStringCreateWithCString(
                ptr::null(),
                c"ActuationSupported".as_ptr(),
                CF_STRING_ENCODING_UTF8,
            );

            let mut device_id = None;
            loop {
                let service = IOIteratorNext(iterator);
                if service == IO_OBJECT_NULL {
                    break;
                }
                if bool_property(service, actuation_key) {
                    device_id = u64_property(service, device_id_key);
                }
                IOObjectRelease(service);
                if device_id.is_some() {
                    break;
                }
            }

            CFRelease(device_id_key);
            CFRelease(actuation_key);
            IOObjectRelease(iterator);

            device_id
        }
    }

    pub fn actuate(device_id: u64, level: u8, intensity: f64) -> Result<(), Box<dyn Error>> {
        unsafe {
            let actuator = MTActuatorCreateFromDeviceID(device_id);
            if actuator.is_null() {
                return Err("failed to create actuator".into());
            }

            if MTActuatorOpen(actuator) != 0 {
                MTActuatorClose(actuator);
                return Err("failed to open actuator".into());
            }

            // The return code of the actuation itself is not meaningful.
            MTActuatorActuate(actuator, i32::from(level), 0, 0.0, intensity as f32);
            MTActuatorClose(actuator);
        }

        Ok(())
    }
}
