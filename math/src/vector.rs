use num::{Float, One, Zero};
use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

pub type Vec3f = Vec3<f32>;
pub type Vec3i = Vec3<i32>;

pub trait Field
    : Mul<Output = Self>
    + Div<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Zero
    + One
    + Copy
    + Clone
    + PartialEq
    + PartialOrd {
}

impl<S> Field for S
where
    S: Mul<Output = S>
        + Div<Output = S>
        + Add<Output = S>
        + Sub<Output = S>
        + Zero
        + One
        + Copy
        + Clone
        + PartialEq
        + PartialOrd,
{
}

#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Field> Vec3<T> {
    #[inline]
    pub fn new(x: T, y: T, z: T) -> Vec3<T> {
        Vec3 { x, y, z }
    }

    #[inline]
    pub fn zero() -> Vec3<T> {
        Vec3::new(T::zero(), T::zero(), T::zero())
    }

    #[inline]
    pub fn dot(&self, rhs: &Vec3<T>) -> T {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(&self, rhs: &Vec3<T>) -> Vec3<T> {
        Vec3::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[inline]
    pub fn squared_norm(&self) -> T {
        self.dot(self)
    }

    #[inline]
    pub fn norm(&self) -> T
    where
        T: Float,
    {
        self.squared_norm().sqrt()
    }

    #[inline]
    pub fn normalized(self) -> Vec3<T>
    where
        T: Float,
    {
        let norm = self.norm();
        if norm == T::zero() {
            Vec3::zero()
        } else {
            self / norm
        }
    }
}

impl<T: Field> Add for Vec3<T> {
    type Output = Vec3<T>;

    #[inline]
    fn add(self, rhs: Vec3<T>) -> Vec3<T> {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Field> Sub for Vec3<T> {
    type Output = Vec3<T>;

    #[inline]
    fn sub(self, rhs: Vec3<T>) -> Vec3<T> {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T: Field> Mul<T> for Vec3<T> {
    type Output = Vec3<T>;

    #[inline]
    fn mul(self, rhs: T) -> Vec3<T> {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl<T: Field> Div<T> for Vec3<T> {
    type Output = Vec3<T>;

    #[inline]
    fn div(self, rhs: T) -> Vec3<T> {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl<T: Field + Neg<Output = T>> Neg for Vec3<T> {
    type Output = Vec3<T>;

    #[inline]
    fn neg(self) -> Vec3<T> {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl<T> Index<usize> for Vec3<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("index out of bounds for Vec3: {}", index),
        }
    }
}

impl<T> IndexMut<usize> for Vec3<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("index out of bounds for Vec3: {}", index),
        }
    }
}
